//! Adapter tests against saved directory pages.

use deptdir_lib::email::is_plausible;
use deptdir_lib::{adapter_for, ExtractError, PageContext, PageExtraction, Record, RoleTag, SiteCatalog};

fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{}", name)).unwrap()
}

fn parse_with(catalog: &SiteCatalog, site: &str, category: &str, document: &str) -> Result<PageExtraction, ExtractError> {
    let site = catalog.get(site).expect("site in catalog");
    let adapter = adapter_for(site.adapter_id()).expect("adapter");
    adapter.parse(&PageContext::new(site, category, 1), document)
}

fn parse(site: &str, category: &str, document: &str) -> Result<PageExtraction, ExtractError> {
    parse_with(&SiteCatalog::embedded().unwrap(), site, category, document)
}

fn parse_fixture(site: &str, category: &str, fixture: &str) -> PageExtraction {
    parse(site, category, &load_fixture(fixture)).unwrap()
}

fn rec(name: &str, title: RoleTag, email: Option<&str>) -> Record {
    Record {
        name: name.to_string(),
        title,
        email: email.map(str::to_string),
    }
}

#[test]
fn brown_grad_sections() {
    let page = parse_fixture("brown", "grad", "brown_grad.html");
    assert_eq!(
        page.records,
        vec![
            rec("Jane Doe", RoleTag::Phd, Some("jdoe@brown.edu")),
            rec("Raj Patel", RoleTag::Phd, Some("rpatel@brown.edu")),
            rec("Ann Lee", RoleTag::Master, Some("alee@brown.edu")),
        ]
    );
}

#[test]
fn brown_grad_title_must_match_section() {
    let html = load_fixture("brown_grad.html").replace(
        "<li class=\"profile-title\">Masters Student</li>",
        "<li class=\"profile-title\">Doctoral Student</li>",
    );
    assert!(matches!(parse("brown", "grad", &html), Err(ExtractError::Malformed { .. })));
}

#[test]
fn brown_grad_unknown_section_is_fatal() {
    let html = load_fixture("brown_grad.html").replace("id=\"masters-students\"", "id=\"visiting-students\"");
    let err = parse("brown", "grad", &html).unwrap_err();
    assert!(err.to_string().contains("visiting-students"), "{}", err);
}

#[test]
fn brown_undergrad_compact_list() {
    let page = parse_fixture("brown", "undergrad", "brown_undergrad.html");
    assert_eq!(
        page.records,
        vec![
            rec("Maya Ortiz", RoleTag::Undergrad, Some("mortiz@brown.edu")),
            rec("Sam Wu", RoleTag::Undergrad, Some("swu@brown.edu")),
        ]
    );
}

#[test]
fn brown_undergrad_needs_exactly_one_compact_list() {
    let html = load_fixture("brown_undergrad.html").replace(
        "</div>\n</body>",
        "<ul class=\"profile-list profile-compact\"></ul>\n</div>\n</body>",
    );
    match parse("brown", "undergrad", &html) {
        Err(ExtractError::AnchorCount { expected, found, .. }) => assert_eq!((expected, found), (1, 2)),
        other => panic!("expected anchor count error, got {:?}", other),
    }
}

#[test]
fn brown_undergrad_ignores_grad_profile_links() {
    let html = load_fixture("brown_undergrad.html").replace("/people/ugrad/swu/", "/people/grad/swu/");
    assert!(matches!(parse("brown", "undergrad", &html), Err(ExtractError::Missing(_))));
}

#[test]
fn brown_directory_classifies_status() {
    let page = parse_fixture("brown", "dir", "brown_dir.html");
    assert_eq!(
        page.records,
        vec![
            rec("Jane Doe", RoleTag::Phd, Some("jdoe@brown.edu")),
            rec("Lee Kim", RoleTag::Staff, Some("lkim@brown.edu")),
            rec("Tom Ng", RoleTag::Master, None),
        ]
    );
    assert_eq!(page.tally.excluded, 1);
    assert_eq!(page.tally.unrecognized, 1);
    assert_eq!(page.tally.total_records(), 3);
    assert_eq!(page.tally.total_with_email(), 2);
}

#[test]
fn brown_directory_header_mismatch() {
    let html = load_fixture("brown_dir.html").replace("<th>Assistant</th>", "<th>Fax</th>");
    match parse("brown", "dir", &html) {
        Err(ExtractError::HeaderMismatch { found, .. }) => assert_eq!(found.last().unwrap(), "Fax"),
        other => panic!("expected header mismatch, got {:?}", other),
    }
}

#[test]
fn caltech_directory() {
    let page = parse_fixture("caltech", "dir", "caltech_dir.html");
    assert_eq!(
        page.records,
        vec![
            rec("Jane Doe", RoleTag::Grad, Some("jdoe@caltech.edu")),
            rec("Mei Chen", RoleTag::Postdoc, Some("mchen@caltech.edu")),
        ]
    );
    assert_eq!(page.tally.excluded, 1);
}

#[test]
fn caltech_grad_list() {
    let html = r#"<html><body><div class="dynamic-2col no-height"><ul>
        <li><a href="http://directory.caltech.edu/cgi-bin/search.cgi?uid=jdoe">Jane Doe</a></li>
        <li><a href="http://directory.caltech.edu/cgi-bin/search.cgi?uid=rpatel">Raj Patel</a></li>
    </ul></div></body></html>"#;
    let page = parse("caltech", "grad", html).unwrap();
    assert_eq!(
        page.records,
        vec![
            rec("Jane Doe", RoleTag::Grad, Some("jdoe@caltech.edu")),
            rec("Raj Patel", RoleTag::Grad, Some("rpatel@caltech.edu")),
        ]
    );
}

#[test]
fn caltech_rejects_foreign_links() {
    let html = r#"<html><body><ul class="no-list-style">
        <li><a href="https://example.com/~jdoe">Jane Doe</a></li>
    </ul></body></html>"#;
    assert!(matches!(parse("caltech", "postdoc", html), Err(ExtractError::Malformed { .. })));
}

#[test]
fn cmu_split_email_spans() {
    let page = parse_fixture("cmu", "all", "cmu_all.html");
    assert_eq!(
        page.records,
        vec![
            rec("Jane Doe", RoleTag::Grad, Some("jdoe@cs.cmu.edu")),
            rec("Sun Park", RoleTag::Staff, None),
            rec("Luis Ortiz", RoleTag::Master, Some("lortiz@andrew.cmu.edu")),
        ]
    );
    assert_eq!(page.tally.excluded, 1);
}

#[test]
fn cmu_user_without_domain_is_fatal() {
    let html = load_fixture("cmu_all.html").replace("<span class=\"d\">andrew.cmu.edu</span>", "");
    assert!(matches!(parse("cmu", "all", &html), Err(ExtractError::Malformed { .. })));
}

#[test]
fn cmu_missing_table() {
    match parse("cmu", "all", "<html><body><p>maintenance</p></body></html>") {
        Err(ExtractError::AnchorCount { expected, found, .. }) => assert_eq!((expected, found), (1, 0)),
        other => panic!("expected anchor count error, got {:?}", other),
    }
}

#[test]
fn columbia_sections_and_hidden_emails() {
    let page = parse_fixture("columbia", "all", "columbia_all.html");
    assert_eq!(
        page.records,
        vec![
            rec("Jane Doe", RoleTag::Phd, Some("jdoe@cs.columbia.edu")),
            rec("Rick Roe", RoleTag::Phd, None),
            rec("Mei Chen", RoleTag::Postdoc, None),
        ]
    );
    // Both faculty rows.
    assert_eq!(page.tally.excluded, 2);
    assert_eq!(page.tally.unrecognized, 0);
}

#[test]
fn columbia_script_arity_is_checked() {
    let html = load_fixture("columbia_all.html").replace(
        "hideemail('x','jdoe','cs.columbia.edu',1,0)",
        "hideemail('jdoe','cs.columbia.edu')",
    );
    assert!(matches!(parse("columbia", "all", &html), Err(ExtractError::Malformed { .. })));
}

#[test]
fn stanford_role_comes_from_category() {
    let page = parse_fixture("stanford", "phd", "stanford_phd.html");
    assert_eq!(
        page.records,
        vec![
            rec("Jane Doe", RoleTag::Phd, Some("jdoe@stanford.edu")),
            rec("Raj Patel", RoleTag::Phd, Some("rpatel@cs.stanford.edu")),
            rec("Ann Lee", RoleTag::Phd, None),
        ]
    );

    let alumni = parse("stanford", "master-alumni", &load_fixture("stanford_phd.html")).unwrap();
    assert!(alumni.records.iter().all(|r| r.title == RoleTag::MasterAlumni));
}

#[test]
fn stanford_empty_name_is_fatal() {
    let html = load_fixture("stanford_phd.html").replace("<td>Lee,   Ann</td>", "<td> </td>");
    assert!(matches!(parse("stanford", "phd", &html), Err(ExtractError::EmptyName(_))));
}

#[test]
fn stanford_expects_one_table() {
    let html = load_fixture("stanford_phd.html").replace("<h1>PhD Students</h1>", "<table><tr><td>ad</td></tr></table>");
    assert!(matches!(parse("stanford", "phd", &html), Err(ExtractError::AnchorCount { .. })));
}

#[test]
fn stanford_category_must_be_a_role() {
    let err = parse("stanford", "faculty", &load_fixture("stanford_phd.html")).unwrap_err();
    assert!(matches!(err, ExtractError::UnknownCategory { .. }));
}

#[test]
fn uci_mailto_entries() {
    let page = parse_fixture("uci", "grad", "uci_grad.html");
    assert_eq!(
        page.records,
        vec![
            rec("Jane Doe", RoleTag::Grad, Some("jdoe@uci.edu")),
            rec("Bob Smith", RoleTag::Grad, Some("bsmith@ics.uci.edu")),
            rec("Kim Vu", RoleTag::Grad, Some("kvu@uci.edu")),
        ]
    );
}

#[test]
fn uci_first_link_must_be_mailto() {
    let html = r#"<html><body><table>
        <tr><td><a href="http://www.ics.uci.edu/~jdoe">Doe, Jane</a></td></tr>
    </table></body></html>"#;
    assert!(matches!(parse("uci", "grad", html), Err(ExtractError::Malformed { .. })));
}

#[test]
fn uci_unexpected_suffix() {
    let html = r#"<html><body><table>
        <tr><td><a href="mailto:jdoe@uci.edu">Doe, Jane</a> | CV</td></tr>
    </table></body></html>"#;
    assert!(matches!(parse("uci", "grad", html), Err(ExtractError::Malformed { .. })));
}

#[test]
fn ucsb_current_students() {
    let page = parse_fixture("ucsb", "grad", "ucsb_grad.html");
    assert_eq!(
        page.records,
        vec![
            rec("Jane Doe", RoleTag::Phd, Some("jdoe@cs.ucsb.edu")),
            rec("Ann Lee", RoleTag::Master, Some("alee@cs.ucsb.edu")),
            rec("Rick Roe", RoleTag::Phd, None),
        ]
    );
    assert_eq!(page.tally.unrecognized, 1);
    assert_eq!(page.tally.emails_dropped, 1);
}

#[test]
fn ucsb_alumni_take_highest_degree() {
    let page = parse_fixture("ucsb", "grad-alumni", "ucsb_alumni.html");
    assert_eq!(
        page.records,
        vec![
            rec("Jane Doe", RoleTag::PhdAlumni, Some("jane@example.com")),
            rec("Ann Lee", RoleTag::MasterAlumni, None),
        ]
    );
}

#[test]
fn ucsb_alumni_page_under_grad_category() {
    let err = parse("ucsb", "grad", &load_fixture("ucsb_alumni.html")).unwrap_err();
    assert!(matches!(err, ExtractError::HeaderMismatch { .. }));
}

#[test]
fn ucsd_directory_research_section_only() {
    let page = parse_fixture("ucsd", "dir", "ucsd_dir.html");
    assert_eq!(
        page.records,
        vec![
            rec("Jane Doe", RoleTag::Staff, Some("jdoe@ucsd.edu")),
            rec("Lee Kim", RoleTag::Staff, None),
            rec("Mei Chen", RoleTag::Staff, None),
        ]
    );
}

#[test]
fn ucsd_directory_link_must_match_text() {
    let html = load_fixture("ucsd_dir.html").replace(
        "<a href=\"mailto:jdoe@ucsd.edu\">jdoe@ucsd.edu</a>",
        "<a href=\"mailto:jane@ucsd.edu\">jdoe@ucsd.edu</a>",
    );
    assert!(matches!(parse("ucsd", "dir", &html), Err(ExtractError::Malformed { .. })));
}

#[test]
fn ucsd_graduating_listing() {
    let page = parse_fixture("ucsd", "phd", "ucsd_phd.html");
    assert_eq!(
        page.records,
        vec![
            rec("Jane Doe", RoleTag::Phd, Some("jdoe@ucsd.edu")),
            rec("Raj Patel", RoleTag::Phd, Some("rpatel@cs.ucsd.edu")),
            rec("Mei Chen", RoleTag::Phd, None),
        ]
    );
}

#[test]
fn umass_grad_table() {
    let page = parse_fixture("umass", "grad", "umass_grad.html");
    assert_eq!(
        page.records,
        vec![
            rec("Jane Doe", RoleTag::Grad, Some("jdoe@cs.umass.edu")),
            rec("Raj Patel", RoleTag::Grad, None),
        ]
    );
}

#[test]
fn umass_graduating_panels() {
    let phd = parse_fixture("umass", "phd", "umass_phd.html");
    assert_eq!(
        phd.records,
        vec![
            rec("Jane Doe", RoleTag::Phd, Some("jdoe@cs.umass.edu")),
            rec("Raj Patel", RoleTag::Phd, None),
        ]
    );
    let master = parse_fixture("umass", "master", "umass_phd.html");
    assert!(master.records.iter().all(|r| r.title == RoleTag::Master));
}

#[test]
fn umass_two_mailto_links_is_fatal() {
    let html = load_fixture("umass_phd.html").replace(
        "<a href=\"https://janedoe.example.com\">Homepage</a>",
        "<a href=\"mailto:jane@example.com\">Personal</a>",
    );
    assert!(matches!(parse("umass", "phd", &html), Err(ExtractError::AnchorCount { .. })));
}

#[test]
fn usc_link_wins_over_text() {
    let page = parse_fixture("usc", "phd", "usc_phd.html");
    assert_eq!(
        page.records,
        vec![
            rec("Jane Doe", RoleTag::Phd, Some("jdoe@usc.edu")),
            rec("Rick Roe", RoleTag::Phd, Some("rroe@usc.edu")),
            rec("Mei Chen", RoleTag::Phd, None),
        ]
    );
}

#[test]
fn usc_name_needs_one_comma() {
    let html = load_fixture("usc_phd.html").replace("<td>Chen,Mei</td>", "<td>Mei Chen</td>");
    assert!(matches!(parse("usc", "phd", &html), Err(ExtractError::Malformed { .. })));
}

#[test]
fn wisc_rows() {
    let page = parse_fixture("wisc", "grad", "wisc_grad.html");
    assert_eq!(
        page.records,
        vec![
            rec("Jane Doe", RoleTag::Grad, Some("jdoe@cs.wisc.edu")),
            rec("Raj Patel", RoleTag::Grad, None),
        ]
    );
}

#[test]
fn wisc_link_must_match_text() {
    let html = load_fixture("wisc_grad.html").replace("href=\"mailto:jdoe@cs.wisc.edu\"", "href=\"/people/jdoe\"");
    assert!(matches!(parse("wisc", "grad", &html), Err(ExtractError::Malformed { .. })));
}

#[test]
fn emitted_records_hold_their_invariants() {
    let cases = [
        ("brown", "grad", "brown_grad.html"),
        ("brown", "undergrad", "brown_undergrad.html"),
        ("brown", "dir", "brown_dir.html"),
        ("caltech", "dir", "caltech_dir.html"),
        ("cmu", "all", "cmu_all.html"),
        ("columbia", "all", "columbia_all.html"),
        ("stanford", "phd", "stanford_phd.html"),
        ("uci", "grad", "uci_grad.html"),
        ("ucsb", "grad", "ucsb_grad.html"),
        ("ucsb", "grad-alumni", "ucsb_alumni.html"),
        ("ucsd", "dir", "ucsd_dir.html"),
        ("ucsd", "phd", "ucsd_phd.html"),
        ("umass", "grad", "umass_grad.html"),
        ("umass", "phd", "umass_phd.html"),
        ("usc", "phd", "usc_phd.html"),
        ("wisc", "grad", "wisc_grad.html"),
    ];
    for (site, category, fixture) in cases {
        let page = parse_fixture(site, category, fixture);
        assert!(!page.is_empty(), "{} produced no records", fixture);
        for record in &page.records {
            assert!(!record.name.trim().is_empty(), "{}: empty name", fixture);
            assert!(!record.name.contains(','), "{}: unordered name {:?}", fixture, record.name);
            assert!(RoleTag::ALL.contains(&record.title));
            if let Some(email) = &record.email {
                assert!(is_plausible(email), "{}: implausible {:?}", fixture, email);
                assert_eq!(email.matches('@').count(), 1);
            }
        }
        assert_eq!(page.tally.total_records(), page.len() as u64);
    }
}

const GENERIC: &str = r#"
[[site]]
id = "example"
name = "Example University"
adapter = "table"

[[site.source]]
category = "people"
url = "https://example.edu/people"

[site.table]
header = ["Name", "Position", "Email"]
name_column = 0
role_column = 1
role_table = "position"
email_column = 2

[[site.roles.position]]
equals = "PhD Student"
tag = "phd"

[[site.roles.position]]
equals = "Faculty"
tag = "exclude"
"#;

const GENERIC_PAGE: &str = r#"<html><body><table>
    <tr><th>Name</th><th>Position</th><th>Email</th></tr>
    <tr><td>Doe, Jane</td><td>PhD Student</td><td>jdoe@x.edu</td></tr>
    <tr><td>Roe, Rick</td><td>Faculty</td><td></td></tr>
</table></body></html>"#;

#[test]
fn generic_table_yields_only_in_scope_rows() {
    let catalog = SiteCatalog::parse(GENERIC).unwrap();
    let page = parse_with(&catalog, "example", "people", GENERIC_PAGE).unwrap();
    assert_eq!(page.records, vec![rec("Jane Doe", RoleTag::Phd, Some("jdoe@x.edu"))]);
    assert_eq!(page.tally.excluded, 1);
}

#[test]
fn generic_table_header_mismatch_emits_nothing() {
    let catalog = SiteCatalog::parse(&GENERIC.replace("\"Position\"", "\"Title\"")).unwrap();
    let page = GENERIC_PAGE.replace("<th>Position</th>", "<th>Phone</th>");
    match parse_with(&catalog, "example", "people", &page) {
        Err(ExtractError::HeaderMismatch { expected, found, .. }) => {
            assert_eq!(expected, ["Name", "Title", "Email"]);
            assert_eq!(found, ["Name", "Phone", "Email"]);
        }
        other => panic!("expected header mismatch, got {:?}", other),
    }
}

#[test]
fn generic_table_without_role_column_uses_category() {
    let toml = r#"
[[site]]
id = "plain"
name = "Plain College"
adapter = "table"
email_domain = "plain.edu"

[[site.source]]
category = "postdoc"
url = "https://plain.edu/postdocs"

[site.table]
header = ["Name", "User"]
name_column = 0
name_order = "last-first"
email_column = 1
"#;
    let catalog = SiteCatalog::parse(toml).unwrap();
    let html = r#"<html><body><table>
        <tr><th>Name</th><th>User</th></tr>
        <tr><td>Doe, Jane</td><td>jdoe</td></tr>
        <tr><td>Roe, Rick</td><td><a href="mailto:rick@elsewhere.org">Rick</a></td></tr>
    </table></body></html>"#;
    let page = parse_with(&catalog, "plain", "postdoc", html).unwrap();
    assert_eq!(
        page.records,
        vec![
            rec("Jane Doe", RoleTag::Postdoc, Some("jdoe@plain.edu")),
            rec("Rick Roe", RoleTag::Postdoc, Some("rick@elsewhere.org")),
        ]
    );
}
