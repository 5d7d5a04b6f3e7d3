use aotboot_rt::ClasslibFunction;
use std::fmt::Write;

pub fn handle_classlib() -> String {
    let mut out = String::new();
    for (index, slot) in ClasslibFunction::ALL.into_iter().enumerate() {
        let _ = write!(out, "{:>2}  {}", index, slot.name());
        if !slot.provided_by_host() {
            out.push_str(" (unset)");
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_are_printed_in_abi_order() {
        let text = handle_classlib();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), ClasslibFunction::COUNT);
        assert_eq!(lines[0], " 0  new-object");
        assert_eq!(lines[7], " 7  append-exception-stack-frame (unset)");
    }
}
