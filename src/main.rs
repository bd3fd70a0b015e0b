fn main() {
    if let Err(err) = draft_lens::run() {
        log::error!("draft-lens failed: {err:#}");
        eprintln!("draft-lens failed: {err:#}");
        std::process::exit(1);
    }
}
