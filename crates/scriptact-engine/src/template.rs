//! Textual wrapping of inline script bodies into a loadable module.
//!
//! Plain string composition. Escaping corruption is caught by the parse
//! pass that follows, never by pattern heuristics here.

/// Wrap raw user statements as the body of the generated entrypoint.
///
/// The user text is embedded verbatim. The generated header destructures
/// the context into the named collaborator bindings scripts rely on; the
/// shell/utility namespace is not embedded here because the host engine
/// provides it as a shared global module.
pub fn wrap(script: &str) -> String {
    format!(
        "\
fn main(ctx, input) {{
    let vcs = ctx.vcs;
    let run = ctx.run;
    let log = ctx.log;
    {script}
}}
"
    )
}
