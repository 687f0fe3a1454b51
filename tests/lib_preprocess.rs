use std::ffi::OsString;

use csv_concat::preprocess_cli_args;
use proptest::prelude::*;

fn to_strings(args: &[OsString]) -> Vec<String> {
    args.iter()
        .map(|value| value.to_string_lossy().to_string())
        .collect()
}

#[test]
fn preprocess_cli_args_rewrites_single_dash_long_flags() {
    let processed = preprocess_cli_args([
        "csv-concat",
        "concat",
        "-ihh",
        "-itype",
        "excel",
        "-otype=tdf",
        "-out",
        "merged.csv",
        "a.csv",
        "b.csv",
    ]);
    assert_eq!(
        to_strings(&processed),
        vec![
            "csv-concat",
            "concat",
            "--ihh",
            "--itype",
            "excel",
            "--otype=tdf",
            "--out",
            "merged.csv",
            "a.csv",
            "b.csv",
        ]
    );
}

#[test]
fn preprocess_cli_args_leaves_flag_values_and_short_flags_alone() {
    let processed = preprocess_cli_args(["csv-concat", "concat", "-od", "-ohh", "-h"]);
    assert_eq!(
        to_strings(&processed),
        vec!["csv-concat", "concat", "--od", "-ohh", "-h"]
    );

    let processed = preprocess_cli_args(["csv-concat", "concat", "--ir", "-id", "-ohh"]);
    assert_eq!(
        to_strings(&processed),
        vec!["csv-concat", "concat", "--ir", "-id", "--ohh"]
    );
}

#[test]
fn preprocess_cli_args_stops_after_double_dash() {
    let processed = preprocess_cli_args(["csv-concat", "concat", "-ihh", "--", "-ohh"]);
    assert_eq!(
        to_strings(&processed),
        vec!["csv-concat", "concat", "--ihh", "--", "-ohh"]
    );
}

proptest! {
    #[test]
    fn preprocess_cli_args_keeps_positional_paths(
        paths in proptest::collection::vec("[A-Za-z0-9_./]{1,12}", 0..6)
    ) {
        let mut args = vec!["csv-concat".to_string(), "concat".to_string(), "-ihh".to_string()];
        args.extend(paths.iter().cloned());
        let processed = to_strings(&preprocess_cli_args(args));
        prop_assert_eq!(processed.len(), paths.len() + 3);
        prop_assert_eq!(processed[2].as_str(), "--ihh");
        for (idx, path) in paths.iter().enumerate() {
            prop_assert_eq!(processed[idx + 3].as_str(), path.as_str());
        }
    }
}
