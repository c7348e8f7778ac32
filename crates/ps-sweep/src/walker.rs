//! Odometer-order Cartesian product walker.

use std::convert::Infallible;

/// Capability set the walker needs from a sweep dimension.
///
/// After `reset` the cursor sits on its first value and is not terminal.
/// `advance` moves to the next value; once no value remains the cursor is
/// terminal and stays so until the next `reset`.
pub trait Cursor {
    type Item: Clone;

    fn reset(&mut self);

    fn advance(&mut self);

    fn is_terminal(&self) -> bool;

    fn current(&self) -> Self::Item;
}

/// Visit every combination of `cursors` exactly once.
///
/// The last cursor varies fastest and carries into the one to its left when
/// it wraps; the walk ends when the first cursor wraps. `visit` receives one
/// item per cursor in the original order. An empty slice is an empty walk.
///
/// Returns the number of combinations visited, or the first error `visit`
/// returned. A completed walk leaves all cursors reset.
pub fn walk_matrix<C, E, F>(cursors: &mut [C], mut visit: F) -> Result<usize, E>
where
    C: Cursor,
    F: FnMut(&[C::Item]) -> Result<(), E>,
{
    for cursor in cursors.iter_mut() {
        cursor.reset();
    }
    if cursors.is_empty() {
        return Ok(0);
    }

    let mut visited = 0;
    let mut combination: Vec<C::Item> = cursors.iter().map(Cursor::current).collect();
    loop {
        visit(&combination)?;
        visited += 1;

        let mut position = cursors.len();
        loop {
            if position == 0 {
                // carry ran past the first cursor
                return Ok(visited);
            }
            position -= 1;
            let cursor = &mut cursors[position];
            cursor.advance();
            if !cursor.is_terminal() {
                break;
            }
            cursor.reset();
        }

        // Only cursors at or right of the carry position changed.
        for (slot, cursor) in combination[position..].iter_mut().zip(&cursors[position..]) {
            *slot = cursor.current();
        }
    }
}

/// Collect every combination in walk order.
pub fn combinations<C: Cursor>(cursors: &mut [C]) -> Vec<Vec<C::Item>> {
    let mut out = Vec::new();
    let walked: Result<usize, Infallible> = walk_matrix(cursors, |items| {
        out.push(items.to_vec());
        Ok(())
    });
    match walked {
        Ok(_) => out,
        Err(never) => match never {},
    }
}
