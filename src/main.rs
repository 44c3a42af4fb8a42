fn main() {
    if let Err(err) = bracket_predictor_lib::run() {
        eprintln!("bracket predictor failed: {err}");
        std::process::exit(1);
    }
}
