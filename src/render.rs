//! JUnit XML rendering of a single [`ModuleReport`].
//!
//! The produced document has one `testsuite` root:
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <testsuite name="math" errors="1" failures="0" tests="2">
//!   <testcase name="addsNumbers"/>
//!   <testcase name="dividesByZero">
//!     <failure message="unexpected exception">Error: unexpected exception
//!     at divide (math.rs:12)</failure>
//!   </testcase>
//! </testsuite>
//! ```

use std::{borrow::Cow, io};

use quick_xml::{
    Writer,
    escape::escape,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event, attributes::Attribute},
    name::QName,
};

use crate::{
    error::RenderError,
    model::{Failure, ModuleReport, TestCaseReport},
};

const INDENT: usize = 2;

pub fn render(report: &ModuleReport) -> Result<String, RenderError> {
    let mut buf = Vec::new();
    render_to(report, &mut buf)?;
    Ok(String::from_utf8(buf)?)
}

pub fn render_to(report: &ModuleReport, target: impl io::Write) -> Result<(), RenderError> {
    let mut writer = Writer::new_with_indent(target, b' ', INDENT);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut suite = BytesStart::new("testsuite");
    suite.push_attribute(attribute("name", &report.name));
    suite.push_attribute(attribute("errors", &report.error_count.to_string()));
    suite.push_attribute(attribute("failures", &report.failure_count.to_string()));
    suite.push_attribute(attribute("tests", &report.tests.to_string()));
    writer.write_event(Event::Start(suite))?;

    for testcase in &report.testcases {
        write_testcase(&mut writer, testcase)?;
    }

    writer.write_event(Event::End(BytesEnd::new("testsuite")))?;
    writer.get_mut().write_all(b"\n")?;
    Ok(())
}

fn write_testcase<W: io::Write>(
    writer: &mut Writer<W>,
    testcase: &TestCaseReport,
) -> Result<(), RenderError> {
    let mut case = BytesStart::new("testcase");
    case.push_attribute(attribute("name", &testcase.name));

    let Some(failure) = &testcase.failure else {
        writer.write_event(Event::Empty(case))?;
        return Ok(());
    };

    writer.write_event(Event::Start(case))?;
    write_failure(writer, failure)?;
    writer.write_event(Event::End(BytesEnd::new("testcase")))?;
    Ok(())
}

fn write_failure<W: io::Write>(writer: &mut Writer<W>, failure: &Failure) -> Result<(), RenderError> {
    let mut element = BytesStart::new("failure");
    element.push_attribute(attribute("message", &failure.message));

    if failure.backtrace.is_empty() {
        writer.write_event(Event::Empty(element))?;
        return Ok(());
    }

    writer.write_event(Event::Start(element))?;
    writer.write_event(Event::Text(BytesText::new(&xml_chars(&failure.backtrace))))?;
    writer.write_event(Event::End(BytesEnd::new("failure")))?;
    Ok(())
}

/// An attribute with its value escaped for use inside double quotes.
///
/// Line breaks and tabs become character references, otherwise parsers would
/// normalize them to plain spaces.
fn attribute<'a>(key: &'a str, value: &str) -> Attribute<'a> {
    let escaped = escape(xml_chars(value).as_ref())
        .replace('\n', "&#10;")
        .replace('\r', "&#13;")
        .replace('\t', "&#9;");
    Attribute {
        key: QName(key.as_bytes()),
        value: Cow::Owned(escaped.into_bytes()),
    }
}

/// Replace characters that XML 1.0 does not allow anywhere in a document,
/// e.g. the escape byte of ANSI color codes in captured output.
fn xml_chars(value: &str) -> Cow<'_, str> {
    fn allowed(c: char) -> bool {
        matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..)
    }

    match value.chars().all(allowed) {
        true => Cow::Borrowed(value),
        false => Cow::Owned(
            value
                .chars()
                .map(|c| match allowed(c) {
                    true => c,
                    false => char::REPLACEMENT_CHARACTER,
                })
                .collect(),
        ),
    }
}
