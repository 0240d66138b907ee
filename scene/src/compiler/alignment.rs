//! Object alignment.

/// Shifts `translation` by half of `size` along every axis the alignment
/// string names.
///
/// Descriptions measure y downwards while the scene measures it upwards, so
/// `top` moves down and `bottom` moves up. `center` (or any string without
/// a direction token) leaves the translation alone.
pub fn apply_alignment(translation: &mut [f32; 3], alignment: &str, size: [f32; 2]) {
    let half_w = size[0] / 2.0;
    let half_h = size[1] / 2.0;

    if alignment.contains("left") {
        translation[0] += half_w;
    }
    if alignment.contains("right") {
        translation[0] -= half_w;
    }
    if alignment.contains("top") {
        translation[1] -= half_h;
    }
    if alignment.contains("bottom") {
        translation[1] += half_h;
    }
}
