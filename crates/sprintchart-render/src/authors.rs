//! Per-chart author registry with deterministic palette colors.
//!
//! A registry lives for one render call. Colors are assigned in two phases:
//! roster order for known people, then the remaining authors in reverse
//! lexicographic order.

use crate::style::Color;
use sprintchart_core::User;
use std::collections::HashMap;
use tracing::trace;

const PALETTE_ALPHA: u8 = 0x7f;

/// Fixed author palette, cycled by index
pub const AUTHOR_PALETTE: [Color; 12] = [
    Color::rgba(0xff, 0x00, 0x00, PALETTE_ALPHA),
    Color::rgba(0x00, 0xff, 0x00, PALETTE_ALPHA),
    Color::rgba(0x00, 0x00, 0xff, PALETTE_ALPHA),
    Color::rgba(0xff, 0xff, 0x00, PALETTE_ALPHA),
    Color::rgba(0x00, 0xff, 0xff, PALETTE_ALPHA),
    Color::rgba(0xff, 0x00, 0xff, PALETTE_ALPHA),
    Color::rgba(0xff, 0x7f, 0x00, PALETTE_ALPHA),
    Color::rgba(0x7f, 0xff, 0x00, PALETTE_ALPHA),
    Color::rgba(0x00, 0x7f, 0xff, PALETTE_ALPHA),
    Color::rgba(0x00, 0xa0, 0x7f, PALETTE_ALPHA),
    Color::rgba(0x7f, 0x00, 0x7f, PALETTE_ALPHA),
    Color::rgba(0x40, 0x40, 0x40, PALETTE_ALPHA),
];

/// Palette color for an assignment index; negative indices are reflected
pub fn author_color(index: i64) -> Color {
    AUTHOR_PALETTE[(index.unsigned_abs() % AUTHOR_PALETTE.len() as u64) as usize]
}

#[derive(Clone, Debug, PartialEq)]
pub struct Author {
    pub name: String,
    pub color: Option<Color>,
}

/// Authors known to one chart, looked up case-insensitively
#[derive(Clone, Debug, Default)]
pub struct AuthorRegistry {
    authors: Vec<Author>,
    index: HashMap<String, usize>,
    /// First palette slot not yet handed out by the sorted pass
    next_slot: usize,
}

impl AuthorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a name; an already known name returns its existing record
    pub fn add(&mut self, name: impl Into<String>) -> &Author {
        let name = name.into();
        let key = name.to_lowercase();
        let slot = match self.index.get(&key) {
            Some(&slot) => slot,
            None => {
                self.authors.push(Author { name, color: None });
                let slot = self.authors.len() - 1;
                self.index.insert(key, slot);
                slot
            }
        };
        &self.authors[slot]
    }

    pub fn get(&self, name: &str) -> Option<&Author> {
        self.index
            .get(&name.to_lowercase())
            .map(|&slot| &self.authors[slot])
    }

    pub fn color_of(&self, name: &str) -> Option<Color> {
        self.get(name).and_then(|a| a.color)
    }

    /// Color of a roster user, tried by name then logins
    pub fn color_of_user(&self, user: &User) -> Option<Color> {
        user.identifiers().find_map(|id| self.color_of(id))
    }

    /// Authors in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Author> {
        self.authors.iter()
    }

    pub fn len(&self) -> usize {
        self.authors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.authors.is_empty()
    }

    /// Assign colors to every uncolored author
    ///
    /// With `authors_are_people`, each roster user first colors the first of
    /// its identifiers that names an uncolored author, using the user's
    /// roster position. The rest are then sorted by name, descending, and
    /// take the following slots. Without it, the rest start at slot 0.
    /// A later call continues after the slots earlier calls handed out.
    pub fn calculate_colors(&mut self, roster: &[User], authors_are_people: bool) {
        if authors_are_people {
            for (position, user) in roster.iter().enumerate() {
                let slot = user.identifiers().find_map(|id| {
                    self.index
                        .get(&id.to_lowercase())
                        .copied()
                        .filter(|&slot| self.authors[slot].color.is_none())
                });
                if let Some(slot) = slot {
                    self.authors[slot].color = Some(author_color(position as i64));
                }
            }
        }

        let offset = if authors_are_people { roster.len() } else { 0 };
        let start = offset.max(self.next_slot);
        let mut rest: Vec<usize> = (0..self.authors.len())
            .filter(|&slot| self.authors[slot].color.is_none())
            .collect();
        rest.sort_by_cached_key(|&slot| {
            let name = &self.authors[slot].name;
            std::cmp::Reverse((name.to_lowercase(), name.clone()))
        });
        self.next_slot = start + rest.len();
        for (k, slot) in rest.into_iter().enumerate() {
            self.authors[slot].color = Some(author_color((start + k) as i64));
        }
        for author in &self.authors {
            trace!(name = %author.name, color = ?author.color.map(|c| c.to_string()), "author color");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn palette_is_cyclic_and_reflected() {
        assert_eq!(author_color(0), AUTHOR_PALETTE[0]);
        assert_eq!(author_color(12), AUTHOR_PALETTE[0]);
        assert_eq!(author_color(13), AUTHOR_PALETTE[1]);
        assert_eq!(author_color(-3), AUTHOR_PALETTE[3]);
        assert!(AUTHOR_PALETTE.iter().all(|c| c.a == 0x7f));
    }

    #[test]
    fn add_returns_existing_record() {
        let mut reg = AuthorRegistry::new();
        reg.add("Alice");
        reg.calculate_colors(&[], false);
        let color = reg.color_of("alice");
        assert_eq!(reg.add("ALICE").color, color);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn rest_sorted_in_reverse_lexicographic_order() {
        let mut reg = AuthorRegistry::new();
        for name in ["bob", "carol", "alice"] {
            reg.add(name);
        }
        reg.calculate_colors(&[], false);
        assert_eq!(reg.color_of("carol"), Some(author_color(0)));
        assert_eq!(reg.color_of("bob"), Some(author_color(1)));
        assert_eq!(reg.color_of("alice"), Some(author_color(2)));
    }

    #[test]
    fn roster_position_decides_people_colors() {
        let roster = vec![
            User::new(1, "Zed"),
            User::new(2, "Bob Builder").login("bob"),
            User::new(3, "Nobody"),
        ];
        let mut reg = AuthorRegistry::new();
        for name in ["bob", "zed", "anna", "mike"] {
            reg.add(name);
        }
        reg.calculate_colors(&roster, true);

        assert_eq!(reg.color_of("zed"), Some(author_color(0)));
        assert_eq!(reg.color_of("bob"), Some(author_color(1)));
        // remaining authors continue after the roster size
        assert_eq!(reg.color_of("mike"), Some(author_color(3)));
        assert_eq!(reg.color_of("anna"), Some(author_color(4)));
        assert_eq!(reg.color_of_user(&roster[1]), Some(author_color(1)));
    }

    #[test]
    fn one_color_per_roster_user() {
        let roster = vec![User::new(1, "alice").login("ali")];
        let mut reg = AuthorRegistry::new();
        reg.add("alice");
        reg.add("ali");
        reg.calculate_colors(&roster, true);
        assert_eq!(reg.color_of("alice"), Some(author_color(0)));
        assert_eq!(reg.color_of("ali"), Some(author_color(1)));
    }

    #[test]
    fn colors_are_never_reassigned() {
        let mut reg = AuthorRegistry::new();
        reg.add("bob");
        reg.calculate_colors(&[], false);
        reg.add("zoe");
        reg.calculate_colors(&[], false);
        assert_eq!(reg.color_of("bob"), Some(author_color(0)));
        assert_eq!(reg.color_of("zoe"), Some(author_color(1)));
    }

    #[test]
    fn later_calls_continue_after_taken_slots() {
        let roster = vec![User::new(1, "alice")];
        let mut reg = AuthorRegistry::new();
        for name in ["alice", "bob", "carl"] {
            reg.add(name);
        }
        reg.calculate_colors(&roster, true);
        reg.add("dora");
        reg.add("alice");
        reg.calculate_colors(&roster, true);

        assert_eq!(reg.color_of("alice"), Some(author_color(0)));
        assert_eq!(reg.color_of("carl"), Some(author_color(1)));
        assert_eq!(reg.color_of("bob"), Some(author_color(2)));
        assert_eq!(reg.color_of("dora"), Some(author_color(3)));
    }

    #[test]
    fn sort_ignores_case() {
        let mut reg = AuthorRegistry::new();
        for name in ["Carol", "bob", "alice"] {
            reg.add(name);
        }
        reg.calculate_colors(&[], false);
        assert_eq!(reg.color_of("carol"), Some(author_color(0)));
        assert_eq!(reg.color_of("Bob"), Some(author_color(1)));
        assert_eq!(reg.color_of("ALICE"), Some(author_color(2)));
    }

    #[test]
    fn independent_registries_agree() {
        let roster = vec![User::new(1, "x"), User::new(2, "y")];
        let build = || {
            let mut reg = AuthorRegistry::new();
            for name in ["q", "y", "p", "x"] {
                reg.add(name);
            }
            reg.calculate_colors(&roster, true);
            reg.iter()
                .map(|a| (a.name.clone(), a.color))
                .collect::<Vec<_>>()
        };
        assert_eq!(build(), build());
    }
}
