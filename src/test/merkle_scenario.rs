use crate::{verify_absence, Error, MerkleTree};

#[test]
fn one_hundred_thousand_leaves() {
    let mut leaves: Vec<Vec<u8>> = (0..100_000).map(|i| format!("leaf{i}").into_bytes()).collect();
    leaves.sort();
    let tree = MerkleTree::build(&leaves);
    let root = tree.root();

    let target_index = leaves.iter().position(|l| l == b"leaf12345").unwrap();
    let proof = tree.proof(target_index).unwrap();
    assert!(MerkleTree::verify(
        &leaves[target_index],
        root,
        target_index,
        leaves.len(),
        &proof
    ));

    assert_eq!(
        tree.absence_proof(b"leaf12345").unwrap_err(),
        Error::TargetExistsInTree
    );

    let absent = tree.absence_proof(b"non_existent_leaf").unwrap();
    assert!(verify_absence(b"non_existent_leaf", root, leaves.len(), &absent));
}
