use super::*;

const LOGIN_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Sign in - Acme</title><script>track()</script></head>
<body>
  <header><nav><a href="/">Home</a><a href="/help">Help</a></nav></header>
  <main>
    <h1>Sign in</h1>
    <form id="login-form">
      <label for="email">Email</label>
      <input id="email" type="email" name="email" value="ann@example.com" required>
      <label for="password">Password</label>
      <input id="password" type="password" name="password" value="hunter2">
      <label><input type="checkbox" name="remember" checked> Remember me</label>
      <button type="submit" class="btn btn-primary" onclick="submitForm()">Sign in</button>
    </form>
    <p>Forgot your password? Contact support for help.</p>
  </main>
  <footer><a href="/privacy">Privacy</a></footer>
</body>
</html>"#;

fn capture(html: &str) -> PageModel {
    InteractionCapture::default().capture(html).unwrap()
}

fn buttons(count: usize, attrs: &str) -> String {
    (0..count)
        .map(|i| format!(r#"<button {}>Button {}</button>"#, attrs, i))
        .collect()
}

#[test]
fn test_login_page_scenario() {
    let model = capture(LOGIN_PAGE);
    assert_eq!(model.title, "Sign in - Acme");
    assert_eq!(model.headings, vec!["Sign in"]);
    assert_eq!(
        model.regions,
        vec![
            LandmarkRegion::Main,
            LandmarkRegion::Navigation,
            LandmarkRegion::Header,
            LandmarkRegion::Footer
        ]
    );

    let names: Vec<(&str, &str)> = model
        .controls
        .iter()
        .map(|c| (c.id.as_str(), c.name.as_str()))
        .collect();
    assert_eq!(
        names,
        vec![
            ("li_1", "Home"),
            ("li_2", "Help"),
            ("tx_1", "Email"),
            ("tx_2", "Password"),
            ("cb_1", "Remember me"),
            ("bu_1", "Sign in"),
            ("li_3", "Privacy"),
        ]
    );

    let email = model.control("tx_1").unwrap();
    assert_eq!(email.selector, "#email");
    assert_eq!(email.states.required, Some(true));
    assert_eq!(email.states.value_len, Some(15));
    assert!(email.states.value.is_none());
    assert_eq!(email.region, Some(LandmarkRegion::Main));

    let password = model.control("tx_2").unwrap();
    assert!(password.states.value.is_none());
    assert!(password.states.value_len.is_none());

    assert_eq!(model.control("cb_1").unwrap().states.checked, Some(true));
    assert_eq!(model.control("li_1").unwrap().region, Some(LandmarkRegion::Navigation));
    assert_eq!(model.control("li_3").unwrap().region, Some(LandmarkRegion::Footer));
    assert_eq!(model.control("li_2").unwrap().states.href.as_deref(), Some("/help"));
    assert!(model.is_consistent());
    assert_eq!(
        model.text_content,
        Some(vec!["Forgot your password? Contact support for help.".to_string()])
    );
}

#[test]
fn test_aimap_bijection_and_id_format() {
    let model = capture(LOGIN_PAGE);
    assert_eq!(model.aimap.len(), model.controls.len());
    for control in &model.controls {
        assert_eq!(model.aimap.get(&control.id), Some(&control.selector));
        let (prefix, counter) = control.id.split_once('_').unwrap();
        assert_eq!(prefix.len(), 2);
        assert!(prefix.chars().all(|c| c.is_ascii_lowercase()));
        assert!(counter.parse::<u32>().unwrap() >= 1);
    }
    let unique: BTreeSet<&String> = model.controls.iter().map(|c| &c.id).collect();
    assert_eq!(unique.len(), model.controls.len());
}

#[test]
fn test_password_never_reported_even_with_values() {
    let capture = InteractionCapture::new(CaptureRequest::default().with_include_values(true));
    let model = capture.capture(LOGIN_PAGE).unwrap();
    let email = model.control("tx_1").unwrap();
    assert_eq!(email.states.value.as_deref(), Some("ann@example.com"));
    let password = model.control("tx_2").unwrap();
    assert!(password.states.value.is_none());
    assert!(password.states.value_len.is_none());
}

#[test]
fn test_handler_like_text_inside_values_survives() {
    let capture = InteractionCapture::new(CaptureRequest::default().with_include_values(true));
    let model = capture
        .capture(
            r#"<html><body>
                 <input id="q" value="status online=yes">
                 <button data-testid="save onload=x">Save</button>
               </body></html>"#,
        )
        .unwrap();

    let field = model.control("tx_1").unwrap();
    assert_eq!(field.states.value.as_deref(), Some("status online=yes"));
    assert_eq!(field.states.value_len, Some(17));

    let button = model.control("bt_1").unwrap();
    assert_eq!(button.selector, r#"[data-testid="save onload=x"]"#);
}

#[test]
fn test_caps_hold_at_ten_times_oversize() {
    let html = format!("<html><body>{}</body></html>", buttons(4000, ""));
    let model = capture(&html);
    assert_eq!(model.controls.len(), 400);
    assert_eq!(model.aimap.len(), 400);

    let capture = InteractionCapture::new(CaptureRequest::default().with_max_controls(40));
    let html = format!("<html><body>{}</body></html>", buttons(400, ""));
    assert_eq!(capture.capture(&html).unwrap().controls.len(), 40);

    let capture = InteractionCapture::new(CaptureRequest::default().with_max_controls(100_000));
    assert_eq!(capture.request().effective_max_controls(), 400);
}

#[test]
fn test_heading_cap() {
    let headings: String = (0..300).map(|i| format!("<h2>Section {}</h2>", i)).collect();
    let model = capture(&format!("<html><body>{}</body></html>", headings));
    assert_eq!(model.headings.len(), 30);
    assert_eq!(model.headings[0], "Section 0");
}

#[test]
fn test_visible_first_then_invisible_fill() {
    let html = format!(
        "<html><body><div hidden>{}</div>{}</body></html>",
        buttons(5, r#"class="late""#),
        buttons(3, r#"class="shown""#)
    );
    let capture = InteractionCapture::new(CaptureRequest::default().with_max_controls(5));
    let model = capture.capture(&html).unwrap();
    let visibility: Vec<bool> = model.controls.iter().map(|c| c.visible).collect();
    assert_eq!(visibility, vec![true, true, true, false, false]);
    assert!(model.controls.iter().all(|c| c.visible == c.in_viewport));
    assert_eq!(model.controls[0].name, "Button 0");
    assert_eq!(model.controls[3].name, "Button 0");
}

#[test]
fn test_region_precedence_aside_nav() {
    let model = capture(
        r#"<html><body><aside><nav><a href="/x">Docs</a></nav></aside></body></html>"#,
    );
    assert_eq!(model.controls[0].region, Some(LandmarkRegion::Navigation));
}

#[test]
fn test_capture_is_idempotent() {
    let first = capture(LOGIN_PAGE);
    let second = capture(LOGIN_PAGE);
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_data_testid_selector() {
    let model = capture(
        r#"<html><body>
            <div class="card"><button data-testid="add-to-cart" class="btn">Add</button></div>
            <div class="card"><button class="btn">Remove</button></div>
        </body></html>"#,
    );
    let add = model.controls.iter().find(|c| c.name == "Add").unwrap();
    assert_eq!(add.selector, r#"[data-testid="add-to-cart"]"#);
    assert_eq!(model.aimap[&add.id], add.selector);
}

#[test]
fn test_nameless_generic_elements_are_dropped() {
    let model = capture(
        r#"<html><body><div tabindex="0"></div><span onclick="x()"></span><div tabindex="0">Card</div></body></html>"#,
    );
    assert_eq!(model.controls.len(), 1);
    assert_eq!(model.controls[0].id, "re_1");
    assert_eq!(model.controls[0].name, "Card");
}

#[test]
fn test_role_fallback_names() {
    let model = capture(
        r#"<html><body><button class="icon"></button><input type="email" class="e"><input name="zip_code"></body></html>"#,
    );
    let names: Vec<&str> = model.controls.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["button", "email input", "Zip code"]);
}

#[test]
fn test_landmark_role_elements_are_not_controls() {
    let model = capture(
        r#"<html><body><div role="navigation"><a href="/a">A</a></div><div role="dialog">Dialog</div></body></html>"#,
    );
    assert_eq!(model.controls.len(), 1);
    assert_eq!(model.controls[0].role, ControlRole::Link);
    assert!(model.regions.contains(&LandmarkRegion::Dialog));
}

#[test]
fn test_inline_iframe_controls() {
    let html = r#"<html><body>
        <main><iframe id="pay" srcdoc="<html><body><button id='confirm'>Confirm</button><iframe srcdoc='&lt;button&gt;Deep&lt;/button&gt;'></iframe></body></html>"></iframe></main>
        <button id="top">Top</button>
    </body></html>"#;
    let model = capture(html);
    let names: Vec<&str> = model.controls.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Top", "Confirm"]);
    let confirm = &model.controls[1];
    assert_eq!(confirm.frame_path, vec!["#pay".to_string()]);
    assert_eq!(confirm.selector, "#confirm");
    assert_eq!(confirm.region, Some(LandmarkRegion::Main));
    assert!(model.controls[0].frame_path.is_empty());

    let deeper = InteractionCapture::new(CaptureRequest {
        max_iframe_depth: 2,
        ..CaptureRequest::default()
    });
    let model = deeper.capture(html).unwrap();
    let deep = model.controls.iter().find(|c| c.name == "Deep").unwrap();
    assert_eq!(deep.frame_path.len(), 2);

    let flat = InteractionCapture::new(CaptureRequest {
        max_iframe_depth: 0,
        ..CaptureRequest::default()
    });
    assert_eq!(flat.capture(html).unwrap().controls.len(), 1);
}

#[test]
fn test_hidden_iframe_content_is_invisible() {
    let html = r#"<html><body><iframe hidden srcdoc="<html><body><button>In</button></body></html>"></iframe></body></html>"#;
    let model = capture(html);
    assert_eq!(model.controls.len(), 1);
    assert!(!model.controls[0].visible);
}

#[test]
fn test_scripts_do_not_leak() {
    let model = capture(
        r#"<html><body><a href="javascript:alert(1)" onclick="evil()">Click</a><script>var secret = 1;</script></body></html>"#,
    );
    let control = &model.controls[0];
    assert_eq!(control.role, ControlRole::Link);
    assert!(control.states.href.is_none());
    let json = serde_json::to_string(&model).unwrap();
    assert!(!json.contains("secret"));
    assert!(!json.contains("evil"));
}

#[test]
fn test_title_truncated() {
    let html = format!("<html><head><title>{}</title></head><body></body></html>", "T".repeat(500));
    let model = capture(&html);
    assert_eq!(model.title.chars().count(), MAX_TITLE_CHARS);
    assert!(model.controls.is_empty());
    assert!(model.text_content.is_none());
}

#[test]
fn test_base_url_applied() {
    let capture = InteractionCapture::new(
        CaptureRequest::default().with_base_url("https://shop.example.com/cart/"),
    );
    let model = capture
        .capture(r#"<html><body><a href="checkout">Checkout</a></body></html>"#)
        .unwrap();
    assert_eq!(model.url.as_deref(), Some("https://shop.example.com/cart/"));
    assert_eq!(
        model.controls[0].states.href.as_deref(),
        Some("https://shop.example.com/cart/checkout")
    );
}

#[test]
fn test_rejects_invalid_input() {
    let err = InteractionCapture::default().capture("<div>fragment</div>").unwrap_err();
    assert!(matches!(err, CaptureError::InvalidHtml(_)));

    let huge = format!("<html>{}</html>", " ".repeat(MAX_HTML_BYTES));
    let err = InteractionCapture::default().capture(&huge).unwrap_err();
    assert!(matches!(err, CaptureError::TooLarge { .. }));
}

#[test]
fn test_id_allocator_counts_per_prefix() {
    let mut ids = IdAllocator::default();
    assert_eq!(ids.next(ControlRole::Button), "bu_1");
    assert_eq!(ids.next(ControlRole::Link), "li_1");
    assert_eq!(ids.next(ControlRole::Button), "bu_2");
    assert_eq!(ids.next(ControlRole::Region), "re_1");
}

#[tokio::test]
async fn test_async_capture() {
    let model = capture_interaction_content(LOGIN_PAGE.to_string(), CaptureRequest::default())
        .await
        .unwrap();
    assert_eq!(model.controls.len(), 7);
}

#[tokio::test]
async fn test_async_capture_timeout() {
    let html = format!("<html><body>{}</body></html>", buttons(20_000, r#"class="b""#));
    let err = capture_with_timeout(html, CaptureRequest::default(), Duration::ZERO)
        .await
        .unwrap_err();
    assert!(matches!(err, CaptureError::Timeout(0)));
}
