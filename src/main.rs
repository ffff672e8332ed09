fn main() {
    celt::run();
}
