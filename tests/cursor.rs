use dlist::{Direction, List, ListError};
#[path = "common/mod.rs"]
mod common;
use common::{ids, tracked};

#[test]
fn test_cursor_walks_both_directions() {
    let (list, _) = tracked(&[1, 2, 3]);

    let mut cursor = list.cursor(Direction::Forward);
    let mut seen = Vec::new();
    while let Some(item) = cursor.next_value(&list).unwrap() {
        seen.push(item.id);
    }
    assert_eq!(seen, vec![1, 2, 3]);

    list.rewind_tail(&mut cursor);
    let mut seen = Vec::new();
    while let Some(node) = cursor.next(&list).unwrap() {
        seen.push(list.value(node).unwrap().id);
    }
    assert_eq!(seen, vec![3, 2, 1]);
    assert!(cursor.is_exhausted());
}

#[test]
fn test_cursor_sees_rotation() {
    let (mut list, _) = tracked(&[1, 2, 3]);
    list.rotate();

    let mut cursor = list.cursor(Direction::Forward);
    assert_eq!(cursor.next_value(&list).unwrap().map(|item| item.id), Some(3));
    assert_eq!(cursor.next_value(&list).unwrap().map(|item| item.id), Some(1));
}

#[test]
fn test_cursor_delete_while_walking_backward() {
    let (mut list, released) = tracked(&[1, 2, 3, 4, 5]);
    let mut cursor = list.cursor(Direction::Backward);

    while let Some(node) = cursor.next(&list).unwrap() {
        if list.value(node).unwrap().id > 2 {
            list.delete(node).unwrap();
        }
    }
    assert_eq!(ids(&list), vec![1, 2]);
    assert_eq!(released.ids(), vec![5, 4, 3]);
}

#[test]
fn test_cursor_on_foreign_list() {
    let (a, _) = tracked(&[1, 2]);
    let (b, _) = tracked(&[1, 2]);

    let mut cursor = a.cursor(Direction::Forward);
    let head = a.first().unwrap();
    assert_eq!(cursor.next(&b), Err(ListError::InvalidNode(head)));
}

#[test]
fn test_cursor_on_empty_list() {
    let list: List<u8> = List::new();
    let mut cursor = list.cursor(Direction::Backward);
    assert!(cursor.is_exhausted());
    assert_eq!(cursor.next_value(&list), Ok(None));
}
