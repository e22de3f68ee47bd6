fn main() {
    wine_regdiff::cli::run();
}
