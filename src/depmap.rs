//! Dependency-name mapping between the Bazel and CMake ecosystems.
//!
//! Bazel labels address targets as `[@repo]//package:target`; the CMake
//! output addresses them by bare target name or by the namespaced names
//! third-party packages export. [`map_dependency`] is a best-effort
//! structural heuristic, not a package resolver: it is pure and total, and
//! every branch is covered by table-driven tests.

/// Hand-curated renames for third-party targets whose CMake names cannot be
/// derived structurally.
const OVERRIDES: &[(&str, &str)] = &[
    ("com_google_protobuf//:protobuf", "protobuf::libprotobuf"),
    (
        "com_google_protobuf//src/google/protobuf/compiler:code_generator",
        "protobuf::libprotoc",
    ),
];

/// Repository prefix of targets that follow the `absl::<name>` convention.
const ABSL_PREFIX: &str = "com_google_absl//";

/// Translate a Bazel dependency label into a CMake target name.
///
/// Checks apply in priority order:
///
/// 1. same-project references (`:target` or `//:target`) strip the marker
///    and map verbatim;
/// 2. exact matches in the override table return the curated literal;
/// 3. `com_google_absl//...` labels map to `absl::<last segment>`;
/// 4. everything else strips to the substring after the last `:`, else
///    after the last `/`, else passes through unchanged.
#[must_use]
pub fn map_dependency(label: &str) -> String {
    let label = label.strip_prefix('@').unwrap_or(label);
    if let Some(target) = label.strip_prefix("//:").or_else(|| label.strip_prefix(':')) {
        return target.to_owned();
    }
    for (from, to) in OVERRIDES {
        if label == *from {
            return (*to).to_owned();
        }
    }
    if let Some(path) = label.strip_prefix(ABSL_PREFIX) {
        let segment = path
            .rsplit_once(':')
            .map_or_else(|| path.rsplit_once('/').map_or(path, |(_, s)| s), |(_, s)| s);
        return format!("absl::{segment}");
    }
    if let Some((_, target)) = label.rsplit_once(':') {
        return target.to_owned();
    }
    if let Some((_, target)) = label.rsplit_once('/') {
        return target.to_owned();
    }
    label.to_owned()
}

#[cfg(test)]
mod tests {
    use super::map_dependency;
    use rstest::rstest;

    #[rstest]
    #[case::local_shorthand(":mini_table", "mini_table")]
    #[case::local_root("//:picopb", "picopb")]
    #[case::local_root_repo("@//:picopb", "picopb")]
    #[case::override_protobuf("@com_google_protobuf//:protobuf", "protobuf::libprotobuf")]
    #[case::override_protoc(
        "@com_google_protobuf//src/google/protobuf/compiler:code_generator",
        "protobuf::libprotoc"
    )]
    #[case::absl_with_target("@com_google_absl//absl/strings:str_format", "absl::str_format")]
    #[case::absl_package_only("@com_google_absl//absl/strings", "absl::strings")]
    #[case::generic_with_target("@com_google_protobuf//src:descriptor", "descriptor")]
    #[case::generic_path_only("third_party/utf8_range", "utf8_range")]
    #[case::opaque("zlib", "zlib")]
    fn maps_every_reference_shape(#[case] label: &str, #[case] expected: &str) {
        assert_eq!(map_dependency(label), expected);
    }
}
