fn main() {
    let v = vec![(1, 2), (3, 4)];
    // stray ) in a comment
    println!("{}", v.len());
}
