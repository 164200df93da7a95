//! Named scenario tests mirroring the worked examples in §8, exercised
//! directly at the `Document`/signature layer so delivery order is
//! fully controlled.

use syncordian_crdt::{Document, InsertOutcome, Line, LineId, VectorClock};
use syncordian_signature::{KeyPair, VerifyingKey};
use syncordian_types::PeerId;

fn verifier(key: VerifyingKey) -> impl Fn(&Line, &Line, &Line) -> bool {
    move |left, line, right| line.verify(left, right, &key)
}

/// S3 — causal skew requiring stash: p1 inserts A then B; p2 receives B
/// before A. B's declared left parent (A) doesn't exist yet in p2's
/// document, so B is stashed; once A arrives and is applied, retrying
/// B succeeds.
#[test]
fn s3_causal_skew_requires_stash_then_resolves() {
    let author = KeyPair::generate();
    let mut p2 = Document::new(PeerId::new(1));

    let (inf, sup) = {
        let (l, r) = p2.parents_of_index(0);
        (l.line_id().clone(), r.line_id().clone())
    };
    let a_id = LineId::allocate_between(&inf, &sup).unwrap();
    let line_a = Line::new_signed(a_id.clone(), "A".into(), PeerId::new(0), &author.signing_key, &inf, &sup);
    let b_id = LineId::allocate_between(&a_id, &sup).unwrap();
    let line_b = Line::new_signed(b_id.clone(), "B".into(), PeerId::new(0), &author.signing_key, &a_id, &sup);

    let verify = verifier(author.verifying_key);

    // remote clock already reflects two broadcasts (A then B) from peer 0.
    let mut remote_vc = VectorClock::new(2);
    remote_vc.tick(PeerId::new(0));
    remote_vc.tick(PeerId::new(0));
    let local_vc = VectorClock::new(2);

    // B arrives first: its left parent (A) is absent, verification fails
    // against every candidate in the permitted window, so it stashes.
    let outcome_b = p2.try_insert_remote(line_b.clone(), &local_vc, &remote_vc, &verify);
    assert_eq!(outcome_b, InsertOutcome::Stash);
    assert_eq!(p2.alive_content(), Vec::<&str>::new());

    // A then arrives and applies directly against the sentinels.
    let mut local_vc = local_vc;
    local_vc.tick(PeerId::new(0));
    let outcome_a = p2.try_insert_remote(line_a, &local_vc, &remote_vc, &verify);
    assert_eq!(outcome_a, InsertOutcome::Applied { index: 1 });
    local_vc.merge(&remote_vc);

    // Retrying B now succeeds: A is in place as its left parent.
    let outcome_b_retry = p2.try_insert_remote(line_b, &local_vc, &remote_vc, &verify);
    assert_eq!(outcome_b_retry, InsertOutcome::Applied { index: 2 });
    assert_eq!(p2.alive_content(), vec!["A", "B"]);
}

/// S4 — Byzantine forge: a line whose signature is internally valid but
/// whose declared parents never exist at a correct peer (fabricated
/// ids) never verifies against any window and is never applied.
#[test]
fn s4_byzantine_forge_never_applies() {
    let attacker = KeyPair::generate();
    let mut doc = Document::new(PeerId::new(0));
    let real = doc
        .insert_by_position(0, "real".into(), PeerId::new(0), &KeyPair::generate().signing_key)
        .unwrap();

    // fabricated parents that don't correspond to any adjacent pair in
    // the document (deliberately allocated past "real" so they can't
    // coincide with an existing id)
    let fake_left = LineId::allocate_between(real.line_id(), &LineId::supremum()).unwrap();
    let fake_right = LineId::allocate_between(&fake_left, &LineId::supremum()).unwrap();
    let forged_id = LineId::allocate_between(&fake_left, &fake_right).unwrap();
    let forged = Line::new_signed(
        forged_id,
        "forged".into(),
        PeerId::new(2),
        &attacker.signing_key,
        &fake_left,
        &fake_right,
    );

    let verify = verifier(attacker.verifying_key);
    let mut remote_vc = VectorClock::new(3);
    remote_vc.tick(PeerId::new(2));
    let local_vc = VectorClock::new(3);

    let before = doc.alive_content();
    let outcome = doc.try_insert_remote(forged, &local_vc, &remote_vc, &verify);
    assert_eq!(outcome, InsertOutcome::Stash);
    assert_eq!(doc.alive_content(), before);
}

/// S5 — delete during concurrent insert: p1 tombstones X; concurrently
/// p2 inserts Y signed against (X_prev, X). Y still applies because
/// tombstoned lines remain valid parents.
#[test]
fn s5_insert_against_tombstoned_parent_still_applies() {
    let author = KeyPair::generate();
    let mut doc = Document::new(PeerId::new(0));
    let x_prev = doc
        .insert_by_position(0, "X_prev".into(), PeerId::new(0), &author.signing_key)
        .unwrap();
    let x = doc
        .insert_by_position(1, "X".into(), PeerId::new(0), &author.signing_key)
        .unwrap();

    // p1 tombstones X locally.
    let x_index = doc.index_of(x.line_id());
    doc.delete_by_index(x_index).unwrap();
    assert!(doc.line_by_id(x.line_id()).unwrap().status().is_tombstone());

    // p2 (modeled here as a concurrent remote insert) signed Y against
    // (X_prev, X) before observing the tombstone.
    let attacker = KeyPair::generate();
    let y_id = LineId::allocate_between(x_prev.line_id(), x.line_id()).unwrap();
    let y = Line::new_signed(y_id, "Y".into(), PeerId::new(1), &attacker.signing_key, x_prev.line_id(), x.line_id());

    let verify = verifier(attacker.verifying_key);
    let mut remote_vc = VectorClock::new(2);
    remote_vc.tick(PeerId::new(1));
    let local_vc = VectorClock::new(2);

    let outcome = doc.try_insert_remote(y, &local_vc, &remote_vc, &verify);
    assert!(matches!(outcome, InsertOutcome::Applied { .. }));
    assert_eq!(doc.alive_content(), vec!["X_prev", "Y"]);
}
