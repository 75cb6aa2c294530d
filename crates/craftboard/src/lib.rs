//! Umbrella crate for Craftboard.
//!
//! Re-exports the board engine and the wire protocol so downstream code can depend on a
//! single crate name (`craftboard`).

pub use craftboard_engine as engine;
pub use craftboard_protocol as protocol;

#[cfg(test)]
mod tests {
    #[test]
    fn reexports_resolve() {
        let board = crate::engine::Board::new_game(Some(1));
        assert_eq!(board.len(), crate::engine::STARTING_ELEMENTS.len());
        assert_eq!(crate::protocol::routes::COMBINE, "/api/combine");
    }
}
