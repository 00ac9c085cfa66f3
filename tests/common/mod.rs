#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use dlist::List;

/// A value type for testing hooks
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: u32,
    pub label: String,
}

impl Item {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            label: format!("item-{id}"),
        }
    }
}

/// Records the ids handed to a release hook, in order
#[derive(Default, Clone)]
pub struct Released(Rc<RefCell<Vec<u32>>>);

impl Released {
    pub fn ids(&self) -> Vec<u32> {
        self.0.borrow().clone()
    }

    pub fn count(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn hook(&self) -> impl Fn(Item) + 'static {
        let sink = self.0.clone();
        move |item: Item| sink.borrow_mut().push(item.id)
    }
}

/// Builds a list of items with a recording release hook installed
pub fn tracked(ids: &[u32]) -> (List<Item>, Released) {
    let released = Released::default();
    let mut list = List::new();
    list.set_release(released.hook());
    for &id in ids {
        list.push_back(Item::new(id)).unwrap();
    }
    (list, released)
}

pub fn ids(list: &List<Item>) -> Vec<u32> {
    list.iter().map(|item| item.id).collect()
}
