use crate::point::Point;

/// Formats a number for text output.
///
/// Without precision, the shortest representation that reads back to the same value is used. With precision,
/// the number is rounded to that many decimal digits and trailing zeros are removed. Negative zero is written
/// as `0`.
pub(crate) fn number(value: f64, precision: Option<usize>) -> String {
    let mut formatted = match precision {
        None => format!("{value}"),
        Some(digits) => {
            let mut rounded = format!("{value:.digits$}");
            if rounded.contains('.') {
                let trimmed = rounded.trim_end_matches('0').trim_end_matches('.').len();
                rounded.truncate(trimmed);
            }
            rounded
        }
    };

    if formatted == "-0" {
        formatted.remove(0);
    }

    formatted
}

/// Writes the ordinates of the point selected by `with_z` and `with_m` separated by `separator`.
pub(crate) fn ordinates(
    point: &Point,
    with_z: bool,
    with_m: bool,
    separator: &str,
    precision: Option<usize>,
) -> String {
    let mut values = vec![point.x(), point.y()];
    if with_z {
        values.push(point.z().unwrap_or_default());
    }
    if with_m {
        values.push(point.m().unwrap_or_default());
    }

    values
        .into_iter()
        .map(|v| number(v, precision))
        .collect::<Vec<_>>()
        .join(separator)
}

/// Writes a point sequence with the given ordinate and point separators.
pub(crate) fn sequence(
    points: &[Point],
    with_z: bool,
    with_m: bool,
    ordinate_separator: &str,
    point_separator: &str,
    precision: Option<usize>,
) -> String {
    points
        .iter()
        .map(|p| ordinates(p, with_z, with_m, ordinate_separator, precision))
        .collect::<Vec<_>>()
        .join(point_separator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shortest_representation() {
        assert_eq!(number(0.0, None), "0");
        assert_eq!(number(-0.0, None), "0");
        assert_eq!(number(10.0, None), "10");
        assert_eq!(number(0.1, None), "0.1");
        assert_eq!(number(-2.5, None), "-2.5");
        assert_eq!(number(10.0 / 9.0, None), "1.1111111111111112");
    }

    #[test]
    fn fixed_precision() {
        assert_eq!(number(10.0 / 9.0, Some(3)), "1.111");
        assert_eq!(number(2.0 / 3.0, Some(3)), "0.667");
        assert_eq!(number(10.0, Some(3)), "10");
        assert_eq!(number(1.5, Some(0)), "2");
        assert_eq!(number(100.0, Some(0)), "100");
        assert_eq!(number(-0.0001, Some(2)), "0");
        assert_eq!(number(1.10, Some(2)), "1.1");
    }

    #[test]
    fn point_ordinates() {
        let point = Point::new_zm(1.0, 2.5, 3.0, 4.0);
        assert_eq!(ordinates(&point, true, true, " ", None), "1 2.5 3 4");
        assert_eq!(ordinates(&point, false, true, ",", None), "1,2.5,4");
        assert_eq!(ordinates(&Point::new(1.0, 2.0), true, false, ",", None), "1,2,0");
        assert_eq!(
            sequence(
                &[Point::new(0.0, 0.0), Point::new(0.0, 10.0)],
                false,
                false,
                ",",
                " ",
                None
            ),
            "0,0 0,10"
        );
    }
}
