fn main() {
    if let Err(err) = trainplan_lib::run() {
        eprintln!("trainplan: {err:#}");
        std::process::exit(1);
    }
}
