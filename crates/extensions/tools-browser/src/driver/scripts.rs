//! Page-side functions run through `Runtime.callFunctionOn`.
//!
//! Each function runs with `this` bound to the handle it is called on.

/// Walk up to the nearest scrollable ancestor, falling back to the
/// document's scrolling element. Leaves the result in `target`.
macro_rules! find_scroller {
    () => {
        "const doc = this.ownerDocument; const win = doc.defaultView;
        let s = this;
        while (s && s !== doc.body && s !== doc.documentElement) {
            const st = win.getComputedStyle(s);
            if (/(auto|scroll)/.test(st.overflowY + st.overflowX)
                && (s.scrollHeight > s.clientHeight || s.scrollWidth > s.clientWidth)) break;
            s = s.parentElement;
        }
        const target = (!s || s === doc.body || s === doc.documentElement)
            ? (doc.scrollingElement || doc.documentElement) : s;"
    };
}

/// Assign `next` through the prototype setter so framework value trackers
/// see a change, then restore the tracker to `previous`.
macro_rules! assign_value {
    () => {
        "const desc = Object.getOwnPropertyDescriptor(Object.getPrototypeOf(this), 'value');
        if (desc && desc.set) { desc.set.call(this, next); } else { this.value = next; }
        if (this._valueTracker) { this._valueTracker.setValue(previous); }"
    };
}

pub(super) const QUERY_SELECTOR: &str = "function(sel) { return this.querySelector(sel); }";

pub(super) const QUERY_ALL: &str =
    "function(sel) { return Array.from(this.querySelectorAll(sel)); }";

pub(super) const FRAME_DOCUMENT: &str = "function() {
    if (this.tagName !== 'IFRAME' && this.tagName !== 'FRAME') return 'not-a-frame';
    try { return this.contentDocument || 'denied'; } catch (e) { return 'denied'; }
}";

pub(super) const SHADOW_ROOT: &str = "function() { return this.shadowRoot; }";

pub(super) const DESCRIBE: &str = "function() {
    const attributes = {};
    for (const a of Array.from(this.attributes || [])) attributes[a.name] = a.value;
    if ((attributes.type || '').toLowerCase() === 'password') delete attributes.value;
    const text = (this.innerText || this.textContent || '').replace(/\\s+/g, ' ').trim().slice(0, 200);
    return { nodeName: this.nodeName.toLowerCase(), attributes, text };
}";

pub(super) const ELEMENT_STATE: &str = "function() {
    if (!this.isConnected) return { connected: false };
    const win = this.ownerDocument.defaultView;
    const style = win.getComputedStyle(this);
    const rect = this.getBoundingClientRect();
    const visible = style.display !== 'none' && style.visibility !== 'hidden'
        && style.opacity !== '0' && rect.width > 0 && rect.height > 0;
    const disabled = !!this.disabled || this.getAttribute('aria-disabled') === 'true'
        || !!(this.closest && this.closest('fieldset:disabled'));
    const kind = (this.type || '').toLowerCase();
    let checked = null;
    if (this.tagName === 'INPUT' && (kind === 'checkbox' || kind === 'radio')) checked = this.checked;
    else if (this.hasAttribute('aria-checked')) checked = this.getAttribute('aria-checked') === 'true';
    const value = this.isContentEditable ? this.innerText
        : (typeof this.value === 'string' ? this.value : null);
    const nonText = ['checkbox', 'radio', 'button', 'submit', 'reset', 'file', 'image', 'hidden', 'range', 'color'];
    const editable = this.isContentEditable || this.tagName === 'SELECT' || this.tagName === 'TEXTAREA'
        || (this.tagName === 'INPUT' && !nonText.includes(kind));
    return {
        connected: true, visible, disabled, checked,
        boundingBox: { x: rect.x, y: rect.y, width: rect.width, height: rect.height },
        text: (this.innerText || '').trim().slice(0, 500),
        value, editable: editable && !this.readOnly,
    };
}";

pub(super) const ELEMENT_FROM_POINT: &str = "function(x, y) {
    const root = this.getRootNode();
    return (root.elementFromPoint ? root : this.ownerDocument).elementFromPoint(x, y);
}";

pub(super) const CONTAINS: &str = "function(node) { return this === node || this.contains(node); }";

pub(super) const PAGE_STATE: &str = "({
    url: location.href,
    scrollX: window.scrollX,
    scrollY: window.scrollY,
    readyState: document.readyState,
})";

pub(super) const OBSERVE_MUTATIONS: &str = "(() => {
    const state = { count: 0 };
    state.observer = new MutationObserver(list => { state.count += list.length; });
    state.observer.observe(document.body || document.documentElement,
        { childList: true, subtree: true, attributes: true, characterData: true });
    return state;
})()";

pub(super) const MUTATION_COUNT: &str = "function() { return this.count; }";

pub(super) const DISCONNECT: &str = "function() { this.observer.disconnect(); }";

pub(super) const CLICK: &str = "function(button, mods) {
    const init = {
        bubbles: true, cancelable: true, view: this.ownerDocument.defaultView,
        ctrlKey: mods.includes('ctrl'), shiftKey: mods.includes('shift'),
        altKey: mods.includes('alt'), metaKey: mods.includes('meta'),
    };
    const fire = (type, extra) => this.dispatchEvent(new MouseEvent(type, Object.assign({}, init, extra)));
    if (button === 'left') {
        if (mods.length === 0) { this.click(); return; }
        fire('mousedown', { button: 0 }); fire('mouseup', { button: 0 }); fire('click', { button: 0, detail: 1 });
    } else if (button === 'double') {
        for (const detail of [1, 2]) {
            fire('mousedown', { button: 0, detail }); fire('mouseup', { button: 0, detail }); fire('click', { button: 0, detail });
        }
        fire('dblclick', { button: 0, detail: 2 });
    } else if (button === 'right') {
        fire('mousedown', { button: 2 }); fire('mouseup', { button: 2 }); fire('contextmenu', { button: 2 });
    } else {
        fire('mousedown', { button: 1 }); fire('mouseup', { button: 1 }); fire('auxclick', { button: 1 });
    }
}";

pub(super) const SCROLL_INTO_VIEW: &str =
    "function() { this.scrollIntoView({ block: 'center', inline: 'center', behavior: 'instant' }); }";

pub(super) const FOCUS: &str = "function() { this.focus(); }";

pub(super) const SET_VALUE: &str = concat!(
    "function(next) {
    if (this.isContentEditable) { this.textContent = next; } else {
        const previous = this.value;",
    assign_value!(),
    "}
    this.dispatchEvent(new Event('input', { bubbles: true }));
    this.dispatchEvent(new Event('change', { bubbles: true }));
}"
);

pub(super) const TYPE_CHAR: &str = concat!(
    "function(ch) {
    const opts = { key: ch, bubbles: true, cancelable: true };
    this.dispatchEvent(new KeyboardEvent('keydown', opts));
    this.dispatchEvent(new KeyboardEvent('keypress', opts));
    if (this.isContentEditable) { this.textContent += ch; } else {
        const previous = this.value; const next = previous + ch;",
    assign_value!(),
    "}
    this.dispatchEvent(new InputEvent('input', { bubbles: true, data: ch, inputType: 'insertText' }));
    this.dispatchEvent(new KeyboardEvent('keyup', opts));
}"
);

pub(super) const COMMIT_VALUE: &str =
    "function() { this.dispatchEvent(new Event('change', { bubbles: true })); }";

pub(super) const SCROLL: &str = concat!(
    "function(op, dx, dy) {",
    find_scroller!(),
    "if (op === 'by') target.scrollBy({ left: dx, top: dy, behavior: 'instant' });
    else if (op === 'top') target.scrollTo({ top: 0, behavior: 'instant' });
    else target.scrollTo({ top: target.scrollHeight, behavior: 'instant' });
}"
);

pub(super) const SCROLL_POSITION: &str = concat!(
    "function() {",
    find_scroller!(),
    "return [target.scrollLeft, target.scrollTop];
}"
);
