use super::Histogram;

pub fn histo(
    lowest_trackable_value: i64,
    highest_trackable_value: i64,
    significant_figures: u8,
) -> Histogram {
    Histogram::new_with_bounds(
        lowest_trackable_value,
        highest_trackable_value,
        significant_figures,
    )
    .unwrap()
}
