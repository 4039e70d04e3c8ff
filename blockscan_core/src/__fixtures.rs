pub const BAR_BLOCK: &str = "{% mytype bar %}
{# a comment
    that inside it has
    {% mytype baz %}
{% endmyothertype %}
{% endmytype %}
{% endmytype %}
    {#
{% endmytype %}#}

some other stuff

{%- endmytype%}";

pub const X_BLOCK: &str = "
{% myothertype x %}
before
{##}
and after
{% endmyothertype %}
";

/// Three blocks, with decoy tags hidden in comments.
pub fn complex_snapshot_file() -> String {
	format!("\n{{#some stuff {{% mytype foo %}} #}}\n{{% mytype foo %}} some stuff {{% endmytype %}}\n\n{BAR_BLOCK}{X_BLOCK}")
}

/// Every trick at once: a self-closing-looking comment, multi-line `do`,
/// quotes that contain tag closers, and a raw region with invalid syntax.
pub const AWFUL_TEMPLATE: &str = r#"
{#} here is a comment with a block inside {% block x %} asdf {% endblock %} {#}
{% do
    set('foo="bar"')
%}
{% set x = ("100" + "hello'" + '%}') %}
{% snapshot something -%}
    {% set x = ("{% endsnapshot %}" + (40 * '%})')) %}
    {# {% endsnapshot %} #}
    {% embedded %}
        some block data right here
    {% endembedded %}
{%- endsnapshot %}

{% raw %}
    {% set x = SYNTAX ERROR}
{% endraw %}


{% materialization whatever, adapter='thing' %}
hi
{% endmaterialization %}
"#;

/// A body with an expression and CRLF line endings.
pub const CRLF_BODY: &str = "{{ config(foo=\"bar\") }}\r\nselect * from this.that\r\n";

pub fn names(names: &[&str]) -> crate::BlockNames {
	crate::BlockNames::new(names.iter().copied())
}
