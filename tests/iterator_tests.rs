use dynarray::DynArray;

#[test]
fn test_iterator_empty_array() {
    let array: DynArray<i32> = DynArray::new();

    let mut iter = array.iter();
    assert_eq!(iter.next(), None);
    assert_eq!(iter.size_hint(), (0, Some(0)));
}

#[test]
fn test_iterator_populated_array() {
    let mut array = DynArray::new();
    array.add("hello").unwrap();
    array.add("world").unwrap();
    array.add("test").unwrap();

    let mut iter = array.iter();
    assert_eq!(iter.size_hint(), (3, Some(3)));

    assert_eq!(iter.next(), Some(&"hello"));
    assert_eq!(iter.len(), 2);

    assert_eq!(iter.next(), Some(&"world"));
    assert_eq!(iter.len(), 1);

    assert_eq!(iter.next(), Some(&"test"));
    assert_eq!(iter.len(), 0);

    assert_eq!(iter.next(), None);
}

#[test]
fn test_iterator_keeps_insertion_order() {
    let mut array = DynArray::new();
    for value in [5, 3, 9, 1, 7] {
        array.add(value).unwrap();
    }

    let collected: Vec<_> = array.iter().copied().collect();
    assert_eq!(collected, vec![5, 3, 9, 1, 7]);
}

#[test]
fn test_reverse_iteration() {
    let array: DynArray<i32> = (1..=4).collect();

    let reversed: Vec<_> = array.iter().rev().copied().collect();
    assert_eq!(reversed, vec![4, 3, 2, 1]);

    let mut iter = array.iter();
    assert_eq!(iter.next(), Some(&1));
    assert_eq!(iter.next_back(), Some(&4));
    assert_eq!(iter.len(), 2);
}

#[test]
fn test_iterator_clone_is_independent() {
    let array: DynArray<i32> = (1..=3).collect();

    let mut iter = array.iter();
    iter.next();
    let cloned = iter.clone();

    assert_eq!(iter.count(), 2);
    assert_eq!(cloned.copied().collect::<Vec<_>>(), vec![2, 3]);
}

#[test]
fn test_for_loop_syntax() {
    let mut array = DynArray::new();
    array.add(10).unwrap();
    array.add(20).unwrap();

    let mut results = Vec::new();
    for value in &array {
        results.push(*value);
    }
    assert_eq!(results, vec![10, 20]);

    for value in &mut array {
        *value += 1;
    }
    assert_eq!(array.as_slice(), &[11, 21]);
}

#[test]
fn test_iter_mut() {
    let mut array: DynArray<String> = ["a", "b"].iter().map(|s| s.to_string()).collect();

    for value in array.iter_mut() {
        value.push('!');
    }
    assert_eq!(array.as_slice(), &["a!", "b!"]);

    let mut iter = array.iter_mut();
    assert_eq!(iter.size_hint(), (2, Some(2)));
    if let Some(last) = iter.next_back() {
        last.clear();
    }
    assert_eq!(array[1], "");
}

#[test]
fn test_iterator_after_clear() {
    let mut array: DynArray<i32> = (1..=3).collect();
    array.clear();

    assert_eq!(array.iter().count(), 0);
    array.add(4).unwrap();
    assert_eq!(array.iter().copied().collect::<Vec<_>>(), vec![4]);
}
