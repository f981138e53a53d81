use pathstore_path::{ancestors, decode, format_path, is_descendant, join, overlaps, parent};
use proptest::prelude::*;

fn segment() -> impl Strategy<Value = String> {
    "[a-z]{1,4}"
}

fn segments() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(segment(), 1..5)
}

proptest! {
    #[test]
    fn decode_inverts_format_for_plain_segments(path in segments()) {
        prop_assert_eq!(decode(format_path(&path).as_str()), path);
    }

    #[test]
    fn every_ancestor_is_an_overlapping_prefix(path in segments()) {
        let formatted = format_path(&path);
        let all: Vec<&str> = ancestors(&formatted).collect();
        prop_assert_eq!(all.len(), path.len() - 1);
        for ancestor in all {
            prop_assert!(is_descendant(&formatted, ancestor));
            prop_assert!(overlaps(&formatted, ancestor));
            prop_assert!(overlaps(ancestor, &formatted));
        }
    }

    #[test]
    fn parent_then_join_restores_path(path in segments()) {
        let formatted = format_path(&path);
        let last = path.last().unwrap();
        let up = parent(&formatted).unwrap();
        prop_assert_eq!(join(up, last), formatted);
    }

    #[test]
    fn disjoint_top_level_keys_never_overlap(a in segments(), b in segments()) {
        prop_assume!(a[0] != b[0]);
        prop_assert!(!overlaps(&format_path(&a), &format_path(&b)));
    }
}

#[test]
fn listener_on_a_b_matching_table() {
    assert!(overlaps("a", "a.b"));
    assert!(overlaps("a.b", "a.b"));
    assert!(overlaps("a.b.c", "a.b"));
    assert!(!overlaps("x", "a.b"));
    assert!(!overlaps("a.bc", "a.b"));
}
