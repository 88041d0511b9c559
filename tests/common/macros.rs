/// Asserts that an entity with the given id is still in the world.
#[macro_export]
macro_rules! assert_present {
    ($world:expr, $id:expr) => {
        assert!(
            $world.find($id).is_some(),
            "Entity {} should be present but was not found",
            $id
        );
    };
}

/// Asserts that an entity with the given id has been removed (killed).
#[macro_export]
macro_rules! assert_gone {
    ($world:expr, $id:expr) => {
        assert!(
            $world.find($id).is_none(),
            "Entity {} should be gone but was found",
            $id
        );
    };
}

/// Asserts that exactly one member of `$members` holds `Rank::Alpha`.
#[macro_export]
macro_rules! assert_single_alpha {
    ($world:expr, $members:expr) => {
        let alphas = $members
            .iter()
            .filter(|id| common::rank_of(&$world, **id) == wolfpack_data::Rank::Alpha)
            .count();
        assert_eq!(alphas, 1, "Expected exactly one Alpha, found {}", alphas);
    };
}
