//! Page slicing for result tables.

use crate::error::DisplayError;

/// One visible page: the clipped row slice plus the number of filler rows a
/// renderer needs to pad the panel to a uniform height.
#[derive(Debug)]
pub struct PageSlice<'a, T> {
    pub rows: &'a [T],
    pub empty_row_count: usize,
}

/// Slice `[page_index * page_size, page_index * page_size + page_size)`
/// clipped to the row count.
pub fn paginate<T>(
    rows: &[T],
    page_index: usize,
    page_size: usize,
) -> Result<PageSlice<'_, T>, DisplayError> {
    if page_size == 0 {
        return Err(DisplayError::Pagination(
            "page size must be greater than 0".to_string(),
        ));
    }

    let start = page_index.saturating_mul(page_size).min(rows.len());
    let end = (start + page_size).min(rows.len());
    let visible = &rows[start..end];

    Ok(PageSlice {
        rows: visible,
        empty_row_count: page_size - visible.len(),
    })
}

/// Number of pages needed to show every row; an empty table still renders
/// one (empty) page.
pub fn page_count(total_rows: usize, page_size: usize) -> usize {
    total_rows.div_ceil(page_size).max(1)
}

/// Footer line in the shape "Showing 1-5 of 12 rows (Page 1 of 3)".
pub fn page_info(total_rows: usize, page_index: usize, page_size: usize) -> String {
    if total_rows == 0 {
        return "No rows".to_string();
    }
    let start = (page_index * page_size).min(total_rows);
    let end = (start + page_size).min(total_rows);
    format!(
        "Showing {}-{} of {} rows (Page {} of {})",
        start + 1,
        end,
        total_rows,
        page_index + 1,
        page_count(total_rows, page_size)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concatenated_pages_reconstruct_rows() {
        let rows: Vec<u32> = (0..23).collect();
        let page_size = 5;

        let mut reassembled = Vec::new();
        for page in 0..page_count(rows.len(), page_size) {
            let slice = paginate(&rows, page, page_size).unwrap();
            reassembled.extend_from_slice(slice.rows);
        }
        assert_eq!(reassembled, rows);
    }

    #[test]
    fn test_last_page_reports_empty_rows() {
        let rows: Vec<u32> = (0..23).collect();
        let slice = paginate(&rows, 4, 5).unwrap();
        assert_eq!(slice.rows, &[20, 21, 22]);
        assert_eq!(slice.empty_row_count, 2);
    }

    #[test]
    fn test_full_page_has_no_empty_rows() {
        let rows: Vec<u32> = (0..10).collect();
        let slice = paginate(&rows, 0, 5).unwrap();
        assert_eq!(slice.rows.len(), 5);
        assert_eq!(slice.empty_row_count, 0);
    }

    #[test]
    fn test_page_beyond_end_is_all_padding() {
        let rows: Vec<u32> = (0..3).collect();
        let slice = paginate(&rows, 9, 5).unwrap();
        assert!(slice.rows.is_empty());
        assert_eq!(slice.empty_row_count, 5);
    }

    #[test]
    fn test_zero_page_size_is_rejected() {
        let rows: Vec<u32> = Vec::new();
        assert!(paginate(&rows, 0, 0).is_err());
    }

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(0, 5), 1);
        assert_eq!(page_count(5, 5), 1);
        assert_eq!(page_count(6, 5), 2);
    }

    #[test]
    fn test_page_info() {
        assert_eq!(
            page_info(23, 0, 5),
            "Showing 1-5 of 23 rows (Page 1 of 5)"
        );
        assert_eq!(
            page_info(23, 4, 5),
            "Showing 21-23 of 23 rows (Page 5 of 5)"
        );
        assert_eq!(page_info(0, 0, 5), "No rows");
    }
}
