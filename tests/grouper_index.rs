mod common;

use chrono::Datelike;
use climgroup::{GroupError, Grouper, LabeledArray};
use common::{arange, daily, tas_series};

fn grouper(group: &str, interp: bool) -> Grouper {
    Grouper::from_group(group).unwrap().with_interp(interp)
}

#[test]
fn whole_series_index_is_ordinal() {
    let tas = tas_series(vec![0.0; 366], "2000-01-01");
    let index = grouper("time", false).get_index(&tas).unwrap();
    assert_eq!(index.name(), Some("time_group"));
    assert_eq!(index.dims(), &["time"]);
    assert_eq!(index.at(&[90]), Some(90.0));
    assert_eq!(index.values(), arange(366));
}

#[test]
fn monthly_index_is_position_in_month() {
    let tas = tas_series(vec![0.0; 366], "2000-01-01");
    let index = grouper("time.month", false).get_index(&tas).unwrap();
    assert_eq!(index.at(&[90]), Some(30.0));
    assert_eq!(index.at(&[91]), Some(0.0));
}

#[test]
fn interpolated_index_is_fractional_and_increasing() {
    let time = daily("2000-01-01", 366);
    let tas = tas_series(vec![0.0; 366], "2000-01-01");
    let values = grouper("time.month", true).get_index(&tas).unwrap().values();

    assert!(values.iter().all(|v| (0.0..1.0).contains(v)));
    for (i, pair) in values.windows(2).enumerate() {
        if time[i].month() == time[i + 1].month() {
            assert!(pair[1] > pair[0], "not increasing at {}", time[i]);
        } else {
            assert_eq!(pair[1], 0.0);
        }
    }
    // 29 days in February 2000.
    approx::assert_relative_eq!(values[31 + 28], 28.0 / 29.0);
}

#[test]
fn weekly_index_counts_from_monday() {
    // 2000-01-03 is a Monday.
    let tas = tas_series(vec![0.0; 14], "2000-01-01");
    let values = grouper("time.week", false).get_index(&tas).unwrap().values();
    assert_eq!(&values[..4], &[5.0, 6.0, 0.0, 1.0]);
}

#[test]
fn group_coordinate_is_continuous_with_interp() {
    let tas = tas_series(vec![0.0; 366], "2000-01-01");
    let plain = grouper("time.month", false).group_coordinate(&tas).unwrap();
    assert_eq!(plain.at(&[90]), Some(3.0));

    let interp = grouper("time.month", true).group_coordinate(&tas).unwrap();
    assert_eq!(interp.at(&[90]), Some(3.5));
    approx::assert_relative_eq!(interp.at(&[0]).unwrap(), 0.5 + 1.0 / 31.0);

    let doy = grouper("time.dayofyear", true).group_coordinate(&tas).unwrap();
    assert_eq!(doy.at(&[90]), Some(91.0));

    let ordinal = grouper("time", false).group_coordinate(&tas).unwrap();
    assert_eq!(ordinal.at(&[90]), Some(90.0));
}

#[test]
fn index_requires_time() {
    let site = LabeledArray::new(["site"], ndarray::ArrayD::zeros(ndarray::IxDyn(&[3]))).unwrap();
    let err = grouper("time.month", false).get_index(&site).unwrap_err();
    assert!(matches!(err, GroupError::IncompatibleInputs(_)));
}
