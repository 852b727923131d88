/// One page of a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<'a, T> {
  pub items: &'a [T],
  /// 1-based page number after clamping
  pub number: usize,
  /// Always at least 1, even for an empty list
  pub total_pages: usize,
  /// Length of the whole list
  pub total_items: usize,
  /// Index of `items[0]` in the whole list
  pub offset: usize,
}

impl<T> Page<'_, T> {
  pub fn has_previous(&self) -> bool {
    self.number > 1
  }

  pub fn has_next(&self) -> bool {
    self.number < self.total_pages
  }

  /// "Showing 11 to 20 of 50"
  pub fn summary(&self) -> String {
    if self.total_items == 0 {
      return "Showing 0 of 0".to_string();
    }
    format!(
      "Showing {} to {} of {}",
      self.offset + 1,
      self.offset + self.items.len(),
      self.total_items
    )
  }
}

/// Number of pages for `len` items, minimum 1.
pub fn total_pages(len: usize, page_size: usize) -> usize {
  len.div_ceil(page_size.max(1)).max(1)
}

/// Slice out page `number` (1-based). Out-of-range numbers are clamped.
pub fn paginate<T>(items: &[T], page_size: usize, number: usize) -> Page<'_, T> {
  let page_size = page_size.max(1);
  let total_pages = total_pages(items.len(), page_size);
  let number = number.clamp(1, total_pages);
  let offset = (number - 1) * page_size;
  let end = (offset + page_size).min(items.len());

  Page {
    items: &items[offset.min(end)..end],
    number,
    total_pages,
    total_items: items.len(),
    offset,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_total_pages() {
    assert_eq!(total_pages(0, 10), 1);
    assert_eq!(total_pages(10, 10), 1);
    assert_eq!(total_pages(11, 10), 2);
    assert_eq!(total_pages(50, 10), 5);
  }

  #[test]
  fn test_last_page_is_partial() {
    let items: Vec<u32> = (1..=23).collect();
    let page = paginate(&items, 10, 3);
    assert_eq!(page.items, &[21, 22, 23]);
    assert_eq!(page.total_pages, 3);
    assert!(page.has_previous());
    assert!(!page.has_next());
    assert_eq!(page.summary(), "Showing 21 to 23 of 23");
  }

  #[test]
  fn test_out_of_range_is_clamped() {
    let items: Vec<u32> = (1..=23).collect();
    assert_eq!(paginate(&items, 10, 0).number, 1);
    assert_eq!(paginate(&items, 10, 99).number, 3);
    assert_eq!(paginate(&items, 10, 99).items, &[21, 22, 23]);
  }

  #[test]
  fn test_empty_list_has_one_empty_page() {
    let items: Vec<u32> = Vec::new();
    let page = paginate(&items, 10, 4);
    assert_eq!(page.number, 1);
    assert_eq!(page.total_pages, 1);
    assert!(page.items.is_empty());
    assert_eq!(page.summary(), "Showing 0 of 0");
  }

  #[test]
  fn test_pages_reconstruct_the_list() {
    for len in [0usize, 1, 9, 10, 11, 37, 50] {
      let items: Vec<usize> = (0..len).collect();
      for size in [1usize, 3, 10, 64] {
        let pages = total_pages(len, size);
        let mut rebuilt = Vec::new();
        for n in 1..=pages {
          let page = paginate(&items, size, n);
          assert!(page.items.len() <= size);
          rebuilt.extend_from_slice(page.items);
        }
        assert_eq!(rebuilt, items);
      }
    }
  }
}
