use std::path::Path;

use turtlelogo::{Canvas, Program, Recorder};

#[derive(Default, Clone)]
pub struct TestCase {
    input: String,
    expected: String,
}

fn exec_one(s: &str) -> Result<String, String> {
    let prog = Program::parse(s).map_err(|e| e.to_string())?;
    let mut rec = Recorder::default();
    prog.exec(&mut rec).map_err(|e| e.to_string())?;
    Ok(String::from_utf8(rec.persist().unwrap()).unwrap())
}

impl TestCase {
    fn exec(&self) {
        let drawn = exec_one(&self.input).unwrap();
        assert_eq!(
            drawn.trim(),
            self.expected.trim(),
            "program:\n{}",
            self.input
        );
    }

    fn exec_failure(&self) {
        let err = exec_one(&self.input).unwrap_err();
        assert_eq!(err, self.expected.trim(), "program:\n{}", self.input);
    }
}

pub fn read_tests(path: impl AsRef<Path>) -> Vec<TestCase> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join(path);
    let text = std::fs::read_to_string(path).unwrap();
    let mut ret = Vec::new();
    let mut in_input = true;
    let mut cur = TestCase::default();

    fn separator_line(line: &str, ch: u8) -> bool {
        line.trim().len() >= 2 && line.trim().bytes().all(|c| c == ch)
    }

    for line in text.split_inclusive('\n') {
        if in_input {
            if separator_line(line, b'-') {
                in_input = false;
            } else {
                cur.input += line;
            }
        } else if separator_line(line, b'=') {
            in_input = true;
            ret.push(std::mem::take(&mut cur));
        } else {
            cur.expected += line;
        }
    }
    ret
}

#[test]
fn text_tests() {
    let tests = read_tests("tests/programs.txt");
    assert!(!tests.is_empty());
    for test in tests {
        test.exec();
    }
}

#[test]
fn exec_failures() {
    let tests = read_tests("tests/failures.txt");
    assert!(!tests.is_empty());
    for test in tests {
        test.exec_failure();
    }
}
