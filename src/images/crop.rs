//! Saliency-guided crop to a fixed output size, and PNG persistence

use anyhow::Result;
use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, ImageFormat};
use std::path::{Path, PathBuf};

/// Crop `img` to the aspect of `width`x`height` and scale it to that size.
///
/// The crop window slides along whichever axis has slack and settles on
/// the position holding the most edge energy.
pub fn crop_to_fit(img: &DynamicImage, width: u32, height: u32) -> DynamicImage {
    let (src_w, src_h) = (img.width(), img.height());
    if src_w == 0 || src_h == 0 || width == 0 || height == 0 {
        return DynamicImage::new_rgba8(width.max(1), height.max(1));
    }

    let target = f64::from(width) / f64::from(height);
    let source = f64::from(src_w) / f64::from(src_h);
    let luma = img.to_luma8();

    let (x, y, crop_w, crop_h) = if source > target {
        let crop_w = ((f64::from(src_h) * target).round() as u32).clamp(1, src_w);
        let x = best_offset(&column_energy(&luma), crop_w as usize);
        (x as u32, 0, crop_w, src_h)
    } else {
        let crop_h = ((f64::from(src_w) / target).round() as u32).clamp(1, src_h);
        let y = best_offset(&row_energy(&luma), crop_h as usize);
        (0, y as u32, src_w, crop_h)
    };

    img.crop_imm(x, y, crop_w, crop_h)
        .resize_exact(width, height, FilterType::Triangle)
}

/// Filename used for the image chosen for `page_url`
pub fn image_filename(page_url: &str) -> String {
    format!("{:x}.png", md5::compute(page_url.as_bytes()))
}

/// Write `img` as PNG into `dir`, named after `page_url`
pub fn save_png(img: &DynamicImage, dir: &Path, page_url: &str) -> Result<PathBuf> {
    let path = dir.join(image_filename(page_url));
    img.save_with_format(&path, ImageFormat::Png)?;
    Ok(path)
}

fn gradient(luma: &GrayImage, x: u32, y: u32) -> u64 {
    let here = i32::from(luma.get_pixel(x, y)[0]);
    let right = if x + 1 < luma.width() {
        i32::from(luma.get_pixel(x + 1, y)[0])
    } else {
        here
    };
    let below = if y + 1 < luma.height() {
        i32::from(luma.get_pixel(x, y + 1)[0])
    } else {
        here
    };
    ((right - here).unsigned_abs() + (below - here).unsigned_abs()) as u64
}

fn column_energy(luma: &GrayImage) -> Vec<u64> {
    (0..luma.width())
        .map(|x| (0..luma.height()).map(|y| gradient(luma, x, y)).sum())
        .collect()
}

fn row_energy(luma: &GrayImage) -> Vec<u64> {
    (0..luma.height())
        .map(|y| (0..luma.width()).map(|x| gradient(luma, x, y)).sum())
        .collect()
}

/// Start of the `window`-long run with the largest energy sum (earliest on ties)
fn best_offset(energy: &[u64], window: usize) -> usize {
    if window >= energy.len() {
        return 0;
    }

    let mut sum: u64 = energy[..window].iter().sum();
    let (mut best, mut best_sum) = (0, sum);

    for start in 1..=energy.len() - window {
        sum = sum + energy[start + window - 1] - energy[start - 1];
        if sum > best_sum {
            best = start;
            best_sum = sum;
        }
    }

    best
}
