use aotboot_rt::DiagnosticStub;
use std::fmt::Write;

pub fn handle_stubs() -> String {
    let mut out = String::new();
    for stub in DiagnosticStub::ALL {
        let exported = if stub.portable_codegen_only() { "portable-codegen" } else { "always" };
        let _ = write!(out, "{:<30}{:<18}", stub.symbol(), exported);
        if stub.reported_name() != stub.symbol() {
            let _ = write!(out, "reports {}", stub.reported_name());
        }
        out.push('\n');
    }
    let _ = writeln!(out, "{:<30}{:<18}walks method and reason strings", "__not_yet_implemented", "always");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_every_stub_once() {
        let text = handle_stubs();
        assert_eq!(text.lines().count(), DiagnosticStub::ALL.len() + 1);
        assert!(text.lines().any(|l| l.starts_with("__range_check_fail") && l.ends_with("ThrowRangeOverflowException")));
        assert!(text.lines().any(|l| l.starts_with("RhpThrowEx") && l.contains("portable-codegen")));
    }
}
