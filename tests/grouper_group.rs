mod common;

use climgroup::{
    calendar::Period, Aggregation, Coord, Dataset, GroupError, Grouper, LabeledArray,
};
use common::{arange, daily, tas_series};

#[test]
fn group_counts_per_period() {
    let tas = tas_series(vec![1.0; 366], "2000-01-01");
    for (group, window, nvals) in [
        ("time", 1, 366.0),
        ("time.month", 1, 31.0),
        ("time.dayofyear", 5, 1.0),
    ] {
        let grouper = Grouper::from_group(group)
            .and_then(|g| g.with_window(window))
            .unwrap();
        let grouped = grouper.group(&tas).unwrap();
        let counts = grouped.count().unwrap().into_array().unwrap();
        if window > 1 {
            assert!(grouped.data().as_array().unwrap().has_dim("window"));
            assert!(counts.has_dim("window"));
        }
        assert_eq!(counts.aggregate(Aggregation::Max), nvals, "{group}");
    }
}

#[test]
fn monthly_groups_of_a_common_year() {
    let tas = tas_series(arange(365), "2001-01-01");
    let grouped = Grouper::from_group("time.month")
        .unwrap()
        .group(&tas)
        .unwrap();
    assert_eq!(grouped.period(), Some(Period::Month));
    assert_eq!(grouped.keys(), (1..=12).collect::<Vec<i64>>().as_slice());
    assert_eq!(
        grouped.sizes(),
        vec![31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31]
    );
    assert_eq!(grouped.members(1).unwrap()[0], 31);

    let feb = grouped.get(1).unwrap().into_array().unwrap();
    assert_eq!(feb.len_of("time"), Some(28));
    assert_eq!(feb.at(&[0]), Some(31.0));
}

#[test]
fn weekly_and_seasonal_groups_cover_the_year() {
    let tas = tas_series(arange(366), "2000-01-01");

    let weeks = Grouper::from_group("time.week").unwrap().group(&tas).unwrap();
    assert_eq!(weeks.len(), 52);
    assert_eq!(weeks.sizes().iter().sum::<usize>(), 366);
    // 2000-01-01 and 2000-01-02 belong to ISO week 52 of 1999.
    let last = weeks.len() - 1;
    assert_eq!(weeks.keys()[last], 52);
    assert_eq!(weeks.sizes()[last], 9);

    let seasons = Grouper::from_group("time.season").unwrap().group(&tas).unwrap();
    assert_eq!(seasons.keys(), &[0, 1, 2, 3]);
    assert_eq!(seasons.sizes(), vec![91, 92, 92, 91]);
}

#[test]
fn windowed_groups_pad_the_edges() {
    let tas = tas_series(arange(366), "2000-01-01");
    let grouped = Grouper::new("time.dayofyear", 5, false, Vec::<String>::new())
        .unwrap()
        .group(&tas)
        .unwrap();
    assert_eq!(grouped.len(), 366);
    assert!(grouped.sizes().iter().all(|&n| n == 1));

    let first = grouped.get(0).unwrap().into_array().unwrap();
    assert_eq!(first.dims(), &["time", "window"]);
    let window: Vec<f64> = first.values();
    assert!(window[0].is_nan() && window[1].is_nan());
    assert_eq!(&window[2..], &[0.0, 1.0, 2.0]);

    let last = grouped.get(365).unwrap().into_array().unwrap();
    let window = last.values();
    assert_eq!(&window[..3], &[363.0, 364.0, 365.0]);
    assert!(window[3].is_nan() && window[4].is_nan());
}

#[test]
fn even_windows_reach_further_into_the_past() {
    let tas = tas_series(arange(10), "2000-01-01");
    let grouped = Grouper::from_group("time")
        .and_then(|g| g.with_window(4))
        .unwrap()
        .group(&tas)
        .unwrap();
    let data = grouped.data().as_array().unwrap();
    let row: Vec<f64> = (0..4).map(|w| data.at(&[5, w]).unwrap()).collect();
    assert_eq!(row, vec![3.0, 4.0, 5.0, 6.0]);
}

#[test]
fn dataset_entries_are_spread_onto_time() {
    let time = daily("2000-01-01", 366);
    let tas = LabeledArray::time_series(time, arange(366)).unwrap();
    let clim = LabeledArray::new(
        ["month"],
        ndarray::ArrayD::from_shape_vec(
            ndarray::IxDyn(&[12]),
            (1..=12).map(|m| m as f64 * 10.0).collect(),
        )
        .unwrap(),
    )
    .unwrap()
    .with_coord("month", Coord::Int((1..=12).collect()))
    .unwrap();
    let offset = LabeledArray::new(["site"], ndarray::ArrayD::from_elem(ndarray::IxDyn(&[2]), 1.5))
        .unwrap();
    let ds = Dataset::new()
        .with_var("tas", tas)
        .with_var("clim", clim)
        .with_var("offset", offset);

    let grouped = Grouper::from_group("time.month").unwrap().group(ds).unwrap();
    let clim = grouped.data().var("clim").unwrap();
    assert_eq!(clim.dims(), &["time"]);
    // 2000-03-31 is the 91st day.
    assert_eq!(clim.at(&[90]), Some(30.0));
    assert_eq!(clim.at(&[91]), Some(40.0));

    let offset = grouped.data().var("offset").unwrap();
    assert_eq!(offset.dims(), &["time", "site"]);
    assert_eq!(offset.shape(), &[366, 2]);
}

#[test]
fn seasonal_entries_match_on_labels() {
    let tas = tas_series(arange(366), "2000-01-01");
    let clim = LabeledArray::new(
        ["season"],
        ndarray::ArrayD::from_shape_vec(ndarray::IxDyn(&[4]), vec![1.0, 2.0, 3.0, 4.0]).unwrap(),
    )
    .unwrap()
    .with_coord(
        "season",
        Coord::Label(["DJF", "MAM", "JJA", "SON"].map(String::from).to_vec()),
    )
    .unwrap();
    let ds = Dataset::new().with_var("tas", tas).with_var("clim", clim);
    let grouped = Grouper::from_group("time.season").unwrap().group(ds).unwrap();
    let clim = grouped.data().var("clim").unwrap();
    assert_eq!(clim.at(&[0]), Some(1.0));
    assert_eq!(clim.at(&[90]), Some(2.0));
    assert_eq!(clim.at(&[365]), Some(1.0));
}

#[test]
fn mismatched_time_axes_are_rejected() {
    let ds = Dataset::new()
        .with_var("a", tas_series(arange(366), "2000-01-01"))
        .with_var("b", tas_series(arange(365), "2000-01-01"));
    let err = Grouper::from_group("time.month").unwrap().group(ds).unwrap_err();
    assert!(matches!(err, GroupError::IncompatibleInputs(_)));

    let ds = Dataset::new()
        .with_var("a", tas_series(arange(10), "2000-01-01"))
        .with_var("b", tas_series(arange(10), "2001-01-01"));
    let err = Grouper::from_group("time").unwrap().group(ds).unwrap_err();
    assert!(matches!(err, GroupError::IncompatibleInputs(_)));
}

#[test]
fn input_without_time_is_rejected() {
    let site = LabeledArray::new(["site"], ndarray::ArrayD::zeros(ndarray::IxDyn(&[3]))).unwrap();
    let err = Grouper::from_group("time").unwrap().group(site).unwrap_err();
    assert!(matches!(err, GroupError::IncompatibleInputs(_)));
}

fn monthly_climatology() -> LabeledArray {
    LabeledArray::new(
        ["month"],
        ndarray::ArrayD::from_shape_vec(
            ndarray::IxDyn(&[12]),
            (1..=12).map(|m| m as f64 * 10.0).collect(),
        )
        .unwrap(),
    )
    .unwrap()
    .with_coord("month", Coord::Int((1..=12).collect()))
    .unwrap()
}

#[test]
fn interpolated_entries_follow_the_group_coordinate() {
    let ds = Dataset::new()
        .with_var("tas", tas_series(arange(366), "2000-01-01"))
        .with_var("clim", monthly_climatology());

    let exact = Grouper::from_group("time.month").unwrap();
    let clim = exact.group(ds.clone()).unwrap().data().var("clim").unwrap().clone();
    assert_eq!(clim.at(&[90]), Some(30.0));

    let interp = exact.with_interp(true);
    let grouped = interp.group(ds).unwrap();
    let clim = grouped.data().var("clim").unwrap();
    assert_eq!(clim.dims(), &["time"]);
    // 2000-03-31 sits at coordinate 3.5, halfway between March and April.
    approx::assert_relative_eq!(clim.at(&[90]).unwrap(), 35.0);
    // The ends of the year interpolate between December and January.
    approx::assert_relative_eq!(clim.at(&[365]).unwrap(), 65.0);
    let jan1 = 0.5 + 1.0 / 31.0;
    approx::assert_relative_eq!(clim.at(&[0]).unwrap(), 120.0 + (10.0 - 120.0) * jan1);
}

#[test]
fn interpolation_keeps_label_and_day_of_year_lookups_exact() {
    let tas = tas_series(arange(366), "2000-01-01");
    let seasons = LabeledArray::new(
        ["season"],
        ndarray::ArrayD::from_shape_vec(ndarray::IxDyn(&[4]), vec![1.0, 2.0, 3.0, 4.0]).unwrap(),
    )
    .unwrap()
    .with_coord(
        "season",
        Coord::Label(["DJF", "MAM", "JJA", "SON"].map(String::from).to_vec()),
    )
    .unwrap();
    let ds = Dataset::new().with_var("tas", tas.clone()).with_var("clim", seasons);
    let grouped = Grouper::from_group("time.season")
        .unwrap()
        .with_interp(true)
        .group(ds)
        .unwrap();
    assert_eq!(grouped.data().var("clim").unwrap().at(&[90]), Some(2.0));

    let doy = LabeledArray::new(
        ["dayofyear"],
        ndarray::ArrayD::from_shape_vec(ndarray::IxDyn(&[366]), arange(366)).unwrap(),
    )
    .unwrap()
    .with_coord("dayofyear", Coord::Int((1..=366).collect()))
    .unwrap();
    let ds = Dataset::new().with_var("tas", tas).with_var("doy", doy);
    let grouped = Grouper::from_group("time.dayofyear")
        .unwrap()
        .with_interp(true)
        .group(ds)
        .unwrap();
    assert_eq!(grouped.data().var("doy").unwrap().values(), arange(366));
}

#[test]
fn repeated_reduction_dims_are_rejected() {
    let tas = tas_series(arange(366), "2000-01-01");
    let grouped = Grouper::from_group("time.month").unwrap().group(&tas).unwrap();
    let err = grouped
        .reduce(Aggregation::Mean, &["time", "time"])
        .unwrap_err();
    assert!(matches!(err, GroupError::IncompatibleInputs(_)));
}
