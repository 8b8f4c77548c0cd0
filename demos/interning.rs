//! Two tables a small s-expression front end keeps side by side: one interning
//! symbol names, and one mapping each parsed form (by address) back to the
//! line and column it was read from.

use robin_hood_table::RobinHoodTable;
use robin_hood_table::hashing::AddressHasher;
use robin_hood_table::hashing::Murmur3;

const SOURCE: &str = "\
(def add (a b)
  (+ a b))

(def twice (f x)
  (f (f x)))

(print (twice add 1))
";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct SymbolId(u32);

#[derive(Clone, Copy, Debug, Default)]
struct SourceLoc {
    line: u32,
    col: u32,
}

enum Form {
    Symbol(SymbolId),
    Number(i64),
    List(Vec<Box<Form>>),
}

fn sum_numbers(form: &Form) -> i64 {
    match form {
        Form::Number(n) => *n,
        Form::Symbol(_) => 0,
        Form::List(items) => items.iter().map(|item| sum_numbers(item)).sum(),
    }
}

struct Context<'src> {
    names: Vec<&'src str>,
    symbols: RobinHoodTable<&'src str, SymbolId, Murmur3>,
    locations: RobinHoodTable<*const Form, SourceLoc, AddressHasher>,
}

impl<'src> Context<'src> {
    fn new() -> Self {
        Self {
            names: Vec::new(),
            symbols: RobinHoodTable::new(),
            locations: RobinHoodTable::new(),
        }
    }

    fn intern(&mut self, name: &'src str) -> SymbolId {
        let next = SymbolId(self.names.len() as u32);
        let id = *self.symbols.entry(name).or_insert(next);
        if id == next {
            self.names.push(name);
        }
        id
    }

    fn name(&self, id: SymbolId) -> &'src str {
        self.names[id.0 as usize]
    }

    /// Boxes `form` and records where it started. Boxing first keeps the
    /// address stable for the lifetime of the tree.
    fn located(&mut self, form: Form, loc: SourceLoc) -> Box<Form> {
        let form = Box::new(form);
        self.locations.put(&*form as *const Form, loc);
        form
    }
}

struct Reader<'src> {
    src: &'src str,
    pos: usize,
    loc: SourceLoc,
}

impl<'src> Reader<'src> {
    fn new(src: &'src str) -> Self {
        Self {
            src,
            pos: 0,
            loc: SourceLoc { line: 1, col: 1 },
        }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) {
        if let Some(ch) = self.peek() {
            self.pos += ch.len_utf8();
            if ch == '\n' {
                self.loc.line += 1;
                self.loc.col = 1;
            } else {
                self.loc.col += 1;
            }
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn read(&mut self, ctx: &mut Context<'src>) -> Result<Option<Box<Form>>, String> {
        self.skip_whitespace();
        let start = self.loc;

        match self.peek() {
            None => Ok(None),
            Some(')') => Err(format!("{}:{}: unexpected ')'", start.line, start.col)),
            Some('(') => {
                self.bump();
                let mut items = Vec::new();
                loop {
                    self.skip_whitespace();
                    match self.peek() {
                        Some(')') => {
                            self.bump();
                            break;
                        }
                        None => {
                            return Err(format!("{}:{}: unterminated list", start.line, start.col));
                        }
                        Some(_) => match self.read(ctx)? {
                            Some(item) => items.push(item),
                            None => unreachable!("peeked a character"),
                        },
                    }
                }
                Ok(Some(ctx.located(Form::List(items), start)))
            }
            Some(_) => {
                let begin = self.pos;
                while self
                    .peek()
                    .is_some_and(|ch| !ch.is_whitespace() && ch != '(' && ch != ')')
                {
                    self.bump();
                }
                let atom = &self.src[begin..self.pos];
                let form = match atom.parse::<i64>() {
                    Ok(n) => Form::Number(n),
                    Err(_) => Form::Symbol(ctx.intern(atom)),
                };
                Ok(Some(ctx.located(form, start)))
            }
        }
    }
}

fn main() -> Result<(), String> {
    let mut ctx = Context::new();
    let mut reader = Reader::new(SOURCE);

    let mut forms = Vec::new();
    while let Some(form) = reader.read(&mut ctx)? {
        forms.push(form);
    }

    println!(
        "Read {} top-level forms, {} located forms, {} distinct symbols",
        forms.len(),
        ctx.locations.len(),
        ctx.symbols.len()
    );

    for form in &forms {
        let loc = ctx
            .locations
            .get(&(&**form as *const Form))
            .copied()
            .unwrap_or_default();
        let head = match &**form {
            Form::List(items) => match items.first().map(|item| &**item) {
                Some(Form::Symbol(id)) => ctx.name(*id),
                _ => "<list>",
            },
            Form::Symbol(id) => ctx.name(*id),
            Form::Number(_) => "<number>",
        };
        println!("  {:>2}:{:<2} ({head} ...)", loc.line, loc.col);
    }

    let total: i64 = forms.iter().map(|form| sum_numbers(form)).sum();
    println!("Sum of numeric literals: {total}");

    let mut symbols: Vec<(&str, SymbolId)> = ctx.symbols.iter().map(|(k, v)| (*k, *v)).collect();
    symbols.sort_by_key(|(_, id)| id.0);
    println!("Symbol table:");
    for (name, id) in symbols {
        println!("  #{:<2} {name}", id.0);
    }

    // The same name always interns to the same symbol.
    let def = ctx.intern("def");
    assert_eq!(ctx.name(def), "def");
    assert_eq!(ctx.symbols.get(&"def"), Some(&def));

    println!();
    println!("{:?}", ctx.symbols);
    Ok(())
}
