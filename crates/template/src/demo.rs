//! Built-in nameplate used when the user has not opened a file yet.

use crate::extract::extract;
use crate::ParsedTemplate;

/// File name reported for the demo model
pub const DEMO_FILE_NAME: &str = "demo.stl";

/// A 150 x 50 x 1 plate with a raised bar and three directives
pub const DEMO_STL: &str = r"solid nameplate
# TEMPLATE_COLOR_nameplate_background #FFA500
# TEMPLATE_COLOR_nameplate_frame #333333
# TEMPLATE_TEXT_nameplate_label BADGER
  facet normal 0 0 -1
    outer loop
      vertex 0 0 0
      vertex 150 50 0
      vertex 150 0 0
    endloop
  endfacet
  facet normal 0 0 -1
    outer loop
      vertex 0 0 0
      vertex 0 50 0
      vertex 150 50 0
    endloop
  endfacet
  facet normal 0 0 1
    outer loop
      vertex 0 0 1
      vertex 150 0 1
      vertex 150 50 1
    endloop
  endfacet
  facet normal 0 0 1
    outer loop
      vertex 0 0 1
      vertex 150 50 1
      vertex 0 50 1
    endloop
  endfacet
  facet normal 0 0 1
    outer loop
      vertex 50 20 2
      vertex 100 20 2
      vertex 100 30 2
    endloop
  endfacet
  facet normal 0 0 1
    outer loop
      vertex 50 20 2
      vertex 100 30 2
      vertex 50 30 2
    endloop
  endfacet
  # Side walls
  facet normal 1 0 0
    outer loop
      vertex 150 0 0
      vertex 150 50 0
      vertex 150 50 1
    endloop
  endfacet
  facet normal 1 0 0
    outer loop
      vertex 150 0 0
      vertex 150 50 1
      vertex 150 0 1
    endloop
  endfacet
  facet normal -1 0 0
    outer loop
      vertex 0 0 0
      vertex 0 50 1
      vertex 0 50 0
    endloop
  endfacet
  facet normal -1 0 0
    outer loop
      vertex 0 0 0
      vertex 0 0 1
      vertex 0 50 1
    endloop
  endfacet
  facet normal 0 1 0
    outer loop
      vertex 0 50 0
      vertex 0 50 1
      vertex 150 50 1
    endloop
  endfacet
  facet normal 0 1 0
    outer loop
      vertex 0 50 0
      vertex 150 50 1
      vertex 150 50 0
    endloop
  endfacet
  facet normal 0 -1 0
    outer loop
      vertex 0 0 0
      vertex 150 0 1
      vertex 0 0 1
    endloop
  endfacet
  facet normal 0 -1 0
    outer loop
      vertex 0 0 0
      vertex 150 0 0
      vertex 150 0 1
    endloop
  endfacet
endsolid nameplate
";

/// Demo template. Demo mode always uses the fallback field set.
pub fn demo_template() -> ParsedTemplate {
    extract(DEMO_STL, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{export, grammar, CustomizationValues};

    #[test]
    fn test_demo_fields() {
        let t = demo_template();
        let pairs: Vec<(&str, &str)> = t
            .fields
            .iter()
            .map(|f| (f.id.as_str(), f.default_value.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("nameplate_background", "#FFA500"),
                ("nameplate_frame", "#333333"),
                ("nameplate_label", "BADGER"),
            ]
        );
    }

    #[test]
    fn test_demo_directives_match_fallback() {
        let parsed = extract(DEMO_STL, false);
        assert_eq!(parsed.fields.len(), 3);
        for (a, b) in parsed.fields.iter().zip(demo_template().fields.iter()) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.default_value, b.default_value);
        }
    }

    #[test]
    fn test_side_walls_comment_is_not_a_directive() {
        assert!(DEMO_STL.contains("# Side walls"));
        assert!(DEMO_STL.lines().filter_map(grammar::parse).count() == 3);
    }

    #[test]
    fn test_demo_label_export() {
        let t = demo_template();
        let mut values: CustomizationValues = t.default_values();
        values.insert("nameplate_label".into(), "ACME".into());
        let out = export(&t.raw_text, &t.fields, &values);
        assert_eq!(
            out,
            DEMO_STL.replace(
                "# TEMPLATE_TEXT_nameplate_label BADGER",
                "# TEMPLATE_NAMEPLATE_LABEL_nameplate_label ACME"
            )
        );
    }
}
