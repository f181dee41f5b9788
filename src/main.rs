fn main() {
    if let Err(err) = nested_frame::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
