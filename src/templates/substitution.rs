use std::collections::HashMap;

use tracing::debug;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Replaces every `{{key}}` with `variables[key]` in a single left-to-right pass.
///
/// Placeholders without a matching key are copied through verbatim. Substituted
/// values are never rescanned, so the result does not depend on map iteration
/// order.
pub fn render(template: &str, variables: &HashMap<String, String>) -> String {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find(OPEN) {
        output.push_str(&rest[..start]);
        let candidate = &rest[start + OPEN.len()..];

        let Some(end) = candidate.find(CLOSE) else {
            output.push_str(&rest[start..]);
            return output;
        };

        let key = &candidate[..end];
        match variables.get(key) {
            Some(value) => {
                output.push_str(value);
                rest = &candidate[end + CLOSE.len()..];
            }
            None => {
                if !key.contains('{') {
                    debug!(placeholder = %key, "Template placeholder left unresolved");
                }
                // Emit one brace and rescan so `{{{key}}}` still resolves the inner key.
                output.push('{');
                rest = &rest[start + 1..];
            }
        }
    }

    output.push_str(rest);
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_replaces_every_occurrence() {
        let rendered = render(
            "{{name}} and {{name}} paid ${{amount}}",
            &vars(&[("name", "Ada"), ("amount", "12.50")]),
        );
        assert_eq!(rendered, "Ada and Ada paid $12.50");
    }

    #[test]
    fn test_unresolved_placeholder_is_left_verbatim() {
        assert_eq!(render("Hello {{missing}}", &HashMap::new()), "Hello {{missing}}");
    }

    #[test]
    fn test_partially_resolved_template() {
        let rendered = render("{{title}} at {{property_name}}", &vars(&[("title", "Leak")]));
        assert_eq!(rendered, "Leak at {{property_name}}");
    }

    #[test]
    fn test_rendering_is_idempotent_without_placeholders() {
        let variables = vars(&[("title", "Leak"), ("message", "Water everywhere")]);
        let once = render("{{title}}: {{message}}", &variables);
        let twice = render(&once, &variables);
        assert_eq!(once, "Leak: Water everywhere");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_values_are_not_rescanned() {
        let variables = vars(&[("a", "{{b}}"), ("b", "boom")]);
        assert_eq!(render("{{a}}|{{b}}", &variables), "{{b}}|boom");
    }

    #[test]
    fn test_unterminated_and_nested_braces() {
        let variables = vars(&[("x", "X")]);
        assert_eq!(render("open {{x", &variables), "open {{x");
        assert_eq!(render("{{{x}}}", &variables), "{X}");
        assert_eq!(render("}}{{x}}{{", &variables), "}}X{{");
    }
}
