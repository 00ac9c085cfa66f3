//! A single threaded doubly linked list whose treatment of stored values is
//! customised through three optional hooks: duplicate, release and match.
//!
//! ```
//! use dlist::{Direction, List};
//!
//! let mut list = List::new();
//! list.push_back(1).unwrap();
//! list.push_back(2).unwrap();
//! list.push_back(3).unwrap();
//!
//! list.rotate();
//! assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec![3, 1, 2]);
//!
//! let tail = list.index(-1).unwrap();
//! assert_eq!(list.value(tail), Ok(&2));
//!
//! let mut cursor = list.cursor(Direction::Backward);
//! assert_eq!(cursor.next_value(&list), Ok(Some(&2)));
//! ```

pub mod cursor;
pub mod error;
pub mod hooks;
pub mod list;
pub mod node;

pub use cursor::Cursor;
pub use error::{HookError, ListError, Result};
pub use hooks::{DuplicateFn, Hooks, MatchFn, ReleaseFn};
pub use list::{IntoIter, Iter, IterMut, List};
pub use node::{Direction, NodeRef};
