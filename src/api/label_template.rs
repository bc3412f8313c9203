use crate::core::NumberFormat;

/// Values substituted into tooltip templates.
#[derive(Debug, Clone, Copy)]
pub struct TemplateContext<'a> {
    pub category: &'a str,
    pub value: f64,
    pub series_name: &'a str,
    pub number_format: NumberFormat,
}

/// Expands `{valueX}`, `{valueY}`, `{categoryX}`, `{categoryY}`, and
/// `{name}`. Unknown placeholders are kept verbatim; an unterminated `{`
/// is copied as text.
#[must_use]
pub fn format_label_template(template: &str, context: TemplateContext<'_>) -> String {
    let mut output = String::with_capacity(template.len() + 16);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        output.push_str(&rest[..open]);
        let after_open = &rest[open + 1..];
        let Some(close) = after_open.find('}') else {
            output.push_str(&rest[open..]);
            return output;
        };

        let key = &after_open[..close];
        match key {
            "valueX" | "valueY" | "value" => {
                output.push_str(&context.number_format.format(context.value));
            }
            "categoryX" | "categoryY" | "category" => output.push_str(context.category),
            "name" => output.push_str(context.series_name),
            _ => {
                output.push('{');
                output.push_str(key);
                output.push('}');
            }
        }
        rest = &after_open[close + 1..];
    }

    output.push_str(rest);
    output
}
