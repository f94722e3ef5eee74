//! Scene-graph attribute encoding for vectors: `position` and `rotation`
//! attributes hold three space-separated numbers (`"0 1.6 -2"`).

use glam::Vec3;

pub fn parse_vec3(s: &str) -> Option<Vec3> {
    let mut it = s.split_whitespace().map(str::parse::<f32>);
    let x = it.next()?.ok()?;
    let y = it.next()?.ok()?;
    let z = it.next()?.ok()?;
    if it.next().is_some() {
        return None;
    }
    Some(Vec3::new(x, y, z))
}

pub fn format_vec3(v: Vec3) -> String {
    format!("{} {} {}", v.x, v.y, v.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_attribute_strings() {
        assert_eq!(parse_vec3("0 1.6 -2"), Some(Vec3::new(0.0, 1.6, -2.0)));
        assert_eq!(parse_vec3("  1.5   2   3 "), Some(Vec3::new(1.5, 2.0, 3.0)));
        assert_eq!(parse_vec3(""), None);
        assert_eq!(parse_vec3("1 2"), None);
        assert_eq!(parse_vec3("1 2 3 4"), None);
        assert_eq!(parse_vec3("a b c"), None);
        let s = format_vec3(Vec3::new(0.0, 1.5, -3.0));
        assert_eq!(parse_vec3(&s), Some(Vec3::new(0.0, 1.5, -3.0)));
    }
}
