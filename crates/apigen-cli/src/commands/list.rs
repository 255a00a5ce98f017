//! List command - the built-in backends.

use apigen::BackendKind;

pub fn run() {
    for kind in BackendKind::ALL {
        println!("{:<28} {}", kind.name(), kind.description());
    }
}
