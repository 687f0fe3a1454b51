fn main() {
    if let Err(err) = csv_concat::run() {
        csv_concat::report_error(&err);
        std::process::exit(1);
    }
}
