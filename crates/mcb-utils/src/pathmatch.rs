//! Glob matching for `project.settings.lineage_exclude_paths` (§4.2).

use globset::{Glob, GlobSet, GlobSetBuilder};

/// Closed set of path segments that always suppress column-level lineage,
/// independent of any project-configured glob.
const ALWAYS_EXCLUDED_SEGMENTS: &[&str] = &["Database/", "Migrations/", "Scripts/"];

/// Filename suffixes that mark a schema-migration script (§4.2).
const MIGRATION_SUFFIXES: &[&str] = &[".Install.sql", ".Upgrade.sql"];

/// Compiled matcher for a project's `lineage_exclude_paths` glob list,
/// plus the always-excluded segments and migration-script suffixes.
pub struct PathMatcher {
    globs: GlobSet,
}

impl PathMatcher {
    /// Build a matcher from a project's configured glob patterns.
    ///
    /// # Errors
    ///
    /// Returns an error if any pattern fails to compile as a glob.
    pub fn new(patterns: &[String]) -> Result<Self, globset::Error> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            builder.add(Glob::new(pattern)?);
        }
        Ok(Self {
            globs: builder.build()?,
        })
    }

    /// An empty matcher — no project-configured exclusions.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            globs: GlobSetBuilder::new()
                .build()
                .expect("an empty glob set always builds"),
        }
    }

    /// Whether `path` should skip column-level lineage emission.
    ///
    /// True when the path matches a configured glob, sits under one of the
    /// closed set of migration directories, or carries a migration-script
    /// filename suffix.
    #[must_use]
    pub fn skip_column_lineage(&self, path: &str) -> bool {
        self.globs.is_match(path)
            || ALWAYS_EXCLUDED_SEGMENTS
                .iter()
                .any(|segment| path.contains(segment))
            || MIGRATION_SUFFIXES
                .iter()
                .any(|suffix| path.ends_with(suffix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migration_directory_is_excluded() {
        let matcher = PathMatcher::empty();
        assert!(matcher.skip_column_lineage("Database/Migrations/01.Install.sql"));
    }

    #[test]
    fn install_suffix_is_excluded_anywhere() {
        let matcher = PathMatcher::empty();
        assert!(matcher.skip_column_lineage("src/foo/Bar.Install.sql"));
    }

    #[test]
    fn upgrade_suffix_is_excluded() {
        let matcher = PathMatcher::empty();
        assert!(matcher.skip_column_lineage("scripts/Patch.Upgrade.sql"));
    }

    #[test]
    fn ordinary_sql_file_is_not_excluded() {
        let matcher = PathMatcher::empty();
        assert!(!matcher.skip_column_lineage("procedures/GetUser.sql"));
    }

    #[test]
    fn project_configured_glob_is_honored() {
        let matcher = PathMatcher::new(&["vendor/**".to_owned()]).expect("valid glob");
        assert!(matcher.skip_column_lineage("vendor/lib/init.sql"));
        assert!(!matcher.skip_column_lineage("app/lib/init.sql"));
    }
}
