//! Validation of the composed WGSL kernel sources.
//!
//! The kernels are only ever compiled on a live device at runtime; these
//! tests push each composed source through naga so a malformed shader fails
//! in CI instead of on the first frame.

use murmuration::kernels;

fn validate_wgsl(label: &str, source: &str) {
    let module = naga::front::wgsl::parse_str(source)
        .unwrap_or_else(|e| panic!("{label}: WGSL parse error: {e:?}"));

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    );
    validator
        .validate(&module)
        .unwrap_or_else(|e| panic!("{label}: WGSL validation error: {e:?}"));
}

#[test]
fn test_clear_kernel_validates() {
    validate_wgsl("clear", &kernels::clear_source());
}

#[test]
fn test_grid_kernel_validates() {
    validate_wgsl("grid", &kernels::grid_source());
}

#[test]
fn test_force_kernel_validates() {
    validate_wgsl("force", &kernels::force_source());
}

#[test]
fn test_integrate_kernel_validates() {
    validate_wgsl("integrate", &kernels::integrate_source());
}

#[test]
fn test_kernels_share_one_entry_point_name() {
    // The driver creates every pipeline with entry point "main".
    for source in [
        kernels::clear_source(),
        kernels::grid_source(),
        kernels::force_source(),
        kernels::integrate_source(),
    ] {
        assert!(source.contains("fn main("));
    }
}
