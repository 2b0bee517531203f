//! Functions run against a resolved node with `Runtime.callFunctionOn`.
//! `this` is the node; results come back by value.

/// Element inner markup. A document yields its root element's outer markup.
pub const INNER_HTML: &str = r#"function() {
    if (this.nodeType === 9) {
        return this.documentElement ? this.documentElement.outerHTML : '';
    }
    if (this.nodeType === 1) {
        return this.innerHTML;
    }
    return this.textContent || '';
}"#;

/// Rendered text of the node and its descendants.
pub const INNER_TEXT: &str = r#"function() {
    const el = this.nodeType === 9 ? this.documentElement : this;
    if (!el) {
        return '';
    }
    if (typeof el.innerText === 'string') {
        return el.innerText;
    }
    return el.textContent || '';
}"#;

/// Whether the node or one of its ancestors matches the selector argument.
pub const CLOSEST: &str = r#"function(selector) {
    try {
        return this.nodeType === 1 && this.closest(selector) !== null;
    } catch (e) {
        return false;
    }
}"#;
