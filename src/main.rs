fn main() {
    if let Err(err) = mindcare_lib::run() {
        eprintln!("mindcare: {:#}", err);
        std::process::exit(1);
    }
}
