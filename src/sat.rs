use image::GrayImage;
use nanorand::{Rng, WyRand};

#[derive(Debug)]
pub struct Rect {
    pub width: u32,
    pub height: u32,
}

#[derive(Clone, Debug)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

pub fn region_is_empty(
    table: &[u32],
    table_width: usize,
    x: usize,
    y: usize,
    width: usize,
    height: usize,
) -> bool {
    let tl = table[y * table_width + x];
    let tr = table[y * table_width + x + width];

    let bl = table[(y + height) * table_width + x];
    let br = table[(y + height) * table_width + x + width];

    tl as i32 + br as i32 - tr as i32 - bl as i32 == 0
}

/// Uniformly picks one of the positions where `rect` fits without touching
/// an occupied pixel, by reservoir sampling over the whole canvas. `None`
/// when no position is left.
pub fn find_space_for_rect(
    table: &[u32],
    table_width: u32,
    table_height: u32,
    rect: &Rect,
    rng: &mut WyRand,
) -> Option<Point> {
    if rect.width >= table_width || rect.height >= table_height {
        return None;
    }

    let max_x = table_width - rect.width;
    let max_y = table_height - rect.height;

    let mut available_points: u32 = 0;
    let mut random_point = None;

    for y in 0..max_y {
        for x in 0..max_x {
            let empty = region_is_empty(
                table,
                table_width as usize,
                x as usize,
                y as usize,
                rect.width as usize,
                rect.height as usize,
            );
            if empty {
                let random_num = rng.generate_range(0..=available_points);
                if random_num == available_points {
                    random_point = Some(Point { x, y });
                }
                available_points += 1;
            }
        }
    }

    random_point
}

/// https://blog.demofox.org/2018/04/16/prefix-sums-and-summed-area-tables/
///
/// Rows before `start_row` must already hold summed values; the running
/// row is seeded from the row above so a partial recompute stays exact.
pub fn to_summed_area_table(table: &mut [u32], width: usize, start_row: usize) {
    let mut prev_row = if start_row == 0 {
        vec![0; width]
    } else {
        table[(start_row - 1) * width..start_row * width].to_vec()
    };

    table
        .chunks_exact_mut(width)
        .skip(start_row)
        .for_each(|row| {
            let mut sum = 0;
            row.iter_mut()
                .zip(prev_row.iter())
                .for_each(|(el, prev_row_el)| {
                    let original_value = *el;
                    *el += sum + prev_row_el;
                    sum += original_value;
                });

            prev_row.clone_from_slice(row)
        });
}

/// Re-derives the summed-area table from the occupancy buffer for every row
/// at or below `start_row`. Called after a word is stamped into the buffer.
pub fn refresh_from_buffer(table: &mut [u32], buffer: &GrayImage, start_row: usize) {
    let width = buffer.width() as usize;
    let raw = buffer.as_raw();
    let offset = start_row * width;

    table[offset..]
        .iter_mut()
        .zip(raw[offset..].iter())
        .for_each(|(el, px)| *el = *px as u32);

    to_summed_area_table(table, width, start_row);
}

#[cfg(test)]
mod tests {
    use image::{GrayImage, Luma};
    use nanorand::WyRand;

    use super::{find_space_for_rect, refresh_from_buffer, region_is_empty, to_summed_area_table, Rect};

    #[test]
    fn summed_area_table_accumulates_both_axes() {
        let mut table = vec![1; 12];
        to_summed_area_table(&mut table, 4, 0);

        // Row-major inclusive prefix sums of a 3x4 grid of ones.
        assert_eq!(table, vec![1, 2, 3, 4, 2, 4, 6, 8, 3, 6, 9, 12]);
    }

    #[test]
    fn partial_recompute_matches_full_recompute() {
        let values: Vec<u32> = (0..24).map(|i| (i * 7) % 3).collect();

        let mut full = values.clone();
        to_summed_area_table(&mut full, 6, 0);

        let mut partial = values.clone();
        to_summed_area_table(&mut partial, 6, 0);
        // Reset the last two rows to raw values, then recompute from there.
        partial[12..].copy_from_slice(&values[12..]);
        to_summed_area_table(&mut partial, 6, 2);

        assert_eq!(partial, full);
    }

    #[test]
    fn occupied_region_is_detected() {
        let mut buffer = GrayImage::from_pixel(8, 8, Luma([0]));
        buffer.put_pixel(4, 4, Luma([1]));

        let mut table = vec![0u32; 64];
        refresh_from_buffer(&mut table, &buffer, 0);

        assert!(!region_is_empty(&table, 8, 3, 3, 3, 3));
        assert!(region_is_empty(&table, 8, 0, 0, 3, 3));
    }

    #[test]
    fn find_space_avoids_occupied_pixels() {
        let mut buffer = GrayImage::from_pixel(16, 16, Luma([0]));
        for x in 0..16 {
            for y in 0..8 {
                buffer.put_pixel(x, y, Luma([1]));
            }
        }

        let mut table = vec![0u32; 256];
        refresh_from_buffer(&mut table, &buffer, 0);

        let mut rng = WyRand::new_seed(7);
        let rect = Rect {
            width: 4,
            height: 4,
        };
        let point = find_space_for_rect(&table, 16, 16, &rect, &mut rng).unwrap();
        // The table convention checks rows y+1..=y+height, so the smallest
        // admissible y sits one row above the free half.
        assert!(point.y >= 7);
    }

    #[test]
    fn oversized_rect_finds_no_space() {
        let table = vec![0u32; 64];
        let mut rng = WyRand::new_seed(7);
        let rect = Rect {
            width: 9,
            height: 2,
        };
        assert!(find_space_for_rect(&table, 8, 8, &rect, &mut rng).is_none());
    }
}
