//! Dotted version comparison
//!
//! Versions are split on `.` and compared component-wise as non-negative
//! integers. Missing trailing components count as zero, so `1.2` and `1.2.0`
//! are equal. A component's value is its leading run of ASCII digits; a
//! component with no leading digits counts as zero.
//!
//! Components are compared as decimal digit strings with leading zeros
//! stripped, so arbitrarily long components never overflow and the order stays
//! total.

use std::cmp::Ordering;

/// Compare two dotted version strings
///
/// `Ordering::Less` means `a` is older than `b`.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let left: Vec<&str> = a.trim().split('.').map(numeric_part).collect();
    let right: Vec<&str> = b.trim().split('.').map(numeric_part).collect();
    let len = left.len().max(right.len());

    for i in 0..len {
        let l = left.get(i).copied().unwrap_or("");
        let r = right.get(i).copied().unwrap_or("");
        match compare_digits(l, r) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

/// Leading digits of a component with leading zeros removed ("" means zero)
fn numeric_part(component: &str) -> &str {
    let component = component.trim();
    let end = component
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(component.len());
    component[..end].trim_start_matches('0')
}

fn compare_digits(a: &str, b: &str) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}
