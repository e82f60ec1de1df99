use behavior_tree::{Selector, guard, rule};

fn positive(input: &i32, _: &mut ()) -> Option<&'static str> {
    (*input > 0).then_some("positive")
}

#[test]
fn builders_compose_into_a_selector() {
    let tree: Selector<i32, (), &'static str> = Selector::new(vec![
        (
            "big",
            guard(
                |input: &i32, _: &()| *input > 100,
                rule(|_: &i32, _: &mut ()| Some("big")),
            ),
        ),
        ("positive", rule(positive)),
    ]);

    assert_eq!(tree.select(&500, &mut ()).map(|d| d.label), Some("big"));
    assert_eq!(tree.select(&5, &mut ()).map(|d| d.label), Some("positive"));
    assert!(tree.select(&-5, &mut ()).is_none());
}
