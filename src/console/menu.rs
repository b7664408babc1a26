use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};
use crate::books::domain::model::Book;
use crate::books::repository::Library;
use crate::core::library::{LibraryError, LibraryResult};

const MENU: &str = "
----  LIBRARY MENU  ----
 1) Add Book by ISBN (Auto)
 2) Remove Book
 3) List Books
 4) Find Book
 5) Add Book (Manual)
 6) Exit
";

// Console reads answers line by line and writes prompts and results.
struct Console<R, W> {
    lines: Lines<R>,
    output: W,
}

impl<R: AsyncBufRead + Unpin, W: AsyncWrite + Unpin> Console<R, W> {
    async fn say(&mut self, text: &str) -> LibraryResult<()> {
        self.output.write_all(text.as_bytes()).await.map_err(console_error)?;
        self.output.write_all(b"\n").await.map_err(console_error)?;
        self.output.flush().await.map_err(console_error)
    }

    // None once the input is exhausted.
    async fn ask(&mut self, prompt: &str) -> LibraryResult<Option<String>> {
        self.output.write_all(prompt.as_bytes()).await.map_err(console_error)?;
        self.output.flush().await.map_err(console_error)?;
        let line = self.lines.next_line().await.map_err(console_error)?;
        Ok(line.map(|l| l.trim().to_string()))
    }
}

fn console_error(err: std::io::Error) -> LibraryError {
    LibraryError::runtime(format!("console io {}", err).as_str(), None)
}

// Runs the menu until Exit is chosen or input ends. Persistence failures end
// the session with the error.
pub async fn run<R, W>(library: &mut dyn Library, input: R, output: W) -> LibraryResult<()>
    where R: AsyncBufRead + Unpin, W: AsyncWrite + Unpin {
    let mut console = Console { lines: input.lines(), output };
    loop {
        console.say(MENU).await?;
        let Some(choice) = console.ask("Your choice: ").await? else {
            break;
        };
        match choice.as_str() {
            "1" => {
                let Some(isbn) = console.ask("ISBN: ").await? else { break };
                match library.add_by_isbn(isbn.as_str()).await? {
                    Some(book) => console.say(format!("Added: {}", book).as_str()).await?,
                    None => console.say("Book not found or network error.").await?,
                }
            }
            "2" => {
                let Some(isbn) = console.ask("ISBN to remove: ").await? else { break };
                let removed = library.remove(isbn.as_str()).await?;
                console.say(if removed { "Book removed." } else { "ISBN not found." }).await?;
            }
            "3" => {
                let books = library.list_all();
                if books.is_empty() {
                    console.say("No books in the library.").await?;
                }
                for book in books {
                    console.say(book.to_string().as_str()).await?;
                }
            }
            "4" => {
                let Some(isbn) = console.ask("ISBN to search: ").await? else { break };
                match library.find(isbn.as_str()) {
                    Some(book) => console.say(book.to_string().as_str()).await?,
                    None => console.say("Book not found.").await?,
                }
            }
            "5" => {
                let Some(title) = console.ask("Title: ").await? else { break };
                let Some(author) = console.ask("Author: ").await? else { break };
                let Some(isbn) = console.ask("ISBN: ").await? else { break };
                match Book::new(title.as_str(), author.as_str(), isbn.as_str()) {
                    Ok(book) => {
                        let added = library.add(book).await?;
                        console.say(if added { "Book added." } else { "This ISBN already exists." }).await?;
                    }
                    Err(err) => console.say(format!("Error: {}", err).as_str()).await?,
                }
            }
            "6" => break,
            _ => console.say("Invalid choice, please try again.").await?,
        }
    }
    console.say("Goodbye.").await
}
